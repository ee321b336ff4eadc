use std::io::stdin;
use std::thread;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::warn;

use crate::console_cmd::ConsoleCmd;

/// Line commands from stdin, for headless mode. The channel closes when
/// stdin does.
pub fn console_input_thread() -> Receiver<ConsoleCmd> {
    let (sender, receiver) = mpsc::channel(100);
    thread::spawn(move || {
        pollster::block_on(console_input_loop(sender))
    });
    receiver
}

pub async fn console_input_loop(sender: Sender<ConsoleCmd>) {
    loop {
        let mut input = String::new();
        match stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("error while reading stdin: {e}");
                break;
            }
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        match ConsoleCmd::parse(input) {
            Ok(cmd) => {
                if sender.send(cmd).await.is_err() {
                    break;
                }
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
}

/// Key presses while the terminal view owns the screen. Raw mode swallows
/// Ctrl-C, so it is mapped to `Quit` here along with `q` and `Esc`.
pub fn key_input_thread() -> Receiver<ConsoleCmd> {
    let (sender, receiver) = mpsc::channel(100);
    thread::spawn(move || {
        pollster::block_on(key_input_loop(sender))
    });
    receiver
}

pub async fn key_input_loop(sender: Sender<ConsoleCmd>) {
    loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => {
                warn!("error while reading terminal input: {e}");
                break;
            }
        };
        let Some(cmd) = key_command(&event) else { continue };
        if sender.send(cmd).await.is_err() {
            break;
        }
    }
}

fn key_command(event: &Event) -> Option<ConsoleCmd> {
    let Event::Key(key) = event else { return None };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(ConsoleCmd::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(ConsoleCmd::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn quit_keys() {
        let press = |code, modifiers| Event::Key(KeyEvent::new(code, modifiers));
        assert_eq!(key_command(&press(KeyCode::Char('q'), KeyModifiers::NONE)), Some(ConsoleCmd::Quit));
        assert_eq!(key_command(&press(KeyCode::Esc, KeyModifiers::NONE)), Some(ConsoleCmd::Quit));
        assert_eq!(key_command(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(ConsoleCmd::Quit));
        assert_eq!(key_command(&press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(key_command(&Event::FocusGained), None);
    }
}
