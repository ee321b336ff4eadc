use std::io::Write;

use anyhow::bail;

use crate::context::ViewerContextRef;
use crate::glyphs::render_text;
use crate::surface::RenderSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCmd {
    Maze,
    Players,
    Show,
    Quit,
}

impl ConsoleCmd {
    pub fn parse(input: &str) -> anyhow::Result<ConsoleCmd> {
        let message_type = match input.find(' ') {
            Some(i) => &input[..i],
            None => input,
        };

        match message_type {
            "maze" => Ok(ConsoleCmd::Maze),
            "players" => Ok(ConsoleCmd::Players),
            "show" => Ok(ConsoleCmd::Show),
            "quit" | "exit" => Ok(ConsoleCmd::Quit),
            _ => bail!("cmd not recognized: {input}"),
        }
    }
}

/// Prints what the viewer currently knows. `Quit` is handled by the caller.
pub async fn process_console_cmd<S: RenderSurface>(
    cmd: ConsoleCmd,
    context_ref: &ViewerContextRef<S>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let context = context_ref.lock().await;
    match cmd {
        ConsoleCmd::Maze => {
            write!(out, "{}", render_text(&context.grid, false))?;
        }
        ConsoleCmd::Players => {
            writeln!(out, "Players:")?;
            for player in &context.previous {
                writeln!(out, "  {} @ {}, {}", player.name, player.x, player.y)?;
            }
            writeln!(out, "status: {}", context.status)?;
        }
        ConsoleCmd::Show => {
            write!(out, "{}", render_text(&context.grid, true))?;
        }
        ConsoleCmd::Quit => {}
    }
    out.flush()?;
    Ok(())
}
