use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc::Receiver, watch};
use tracing::{info, warn};

use viewer::bootstrap::{bootstrap, BootstrapOutcome};
use viewer::config::ViewerConfig;
use viewer::console_cmd::{process_console_cmd, ConsoleCmd};
use viewer::console_input::{console_input_thread, key_input_thread};
use viewer::poll_loop::spawn_poll_loop;
use viewer::provider::HttpProvider;
use viewer::surface::headless::HeadlessSurface;
use viewer::surface::terminal::{TerminalSession, TerminalSurface};
use viewer::surface::RenderSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ViewerConfig::parse();
    viewer::logging::init(&config)?;

    let provider = Arc::new(HttpProvider::new(&config.server, config.request_timeout())?);
    info!("watching maze at {}", config.server);

    if config.headless {
        run_viewer(&config, HeadlessSurface::new(), provider, console_input_thread()).await;
    } else {
        let _session = TerminalSession::enter()?;
        let surface = TerminalSurface::buffered(std::io::stdout());
        run_viewer(&config, surface, provider, key_input_thread()).await;
    }

    Ok(())
}

async fn run_viewer<S: RenderSurface + Send + 'static>(
    config: &ViewerConfig,
    surface: S,
    provider: Arc<HttpProvider>,
    mut commands: Receiver<ConsoleCmd>,
) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (context_ref, poll_handle, _failed_surface) = match bootstrap(surface, provider.as_ref()).await {
        BootstrapOutcome::Ready(context) => {
            let context_ref = context.into_ref();
            let handle = spawn_poll_loop(context_ref.clone(), provider.clone(), config.poll_config(), shutdown_rx);
            (Some(context_ref), Some(handle), None)
        }
        // Keep the error on screen until the user leaves.
        BootstrapOutcome::Failed { surface, .. } => (None, None, Some(surface)),
    };

    let mut commands_open = true;
    loop {
        tokio::select! {
            cmd = commands.recv(), if commands_open => {
                let Some(cmd) = cmd else {
                    commands_open = false;
                    continue;
                };
                if cmd == ConsoleCmd::Quit {
                    break;
                }
                let Some(context_ref) = &context_ref else {
                    eprintln!("maze not loaded");
                    continue;
                };
                let mut stderr = std::io::stderr();
                if let Err(e) = process_console_cmd(cmd, context_ref, &mut stderr).await {
                    warn!("error: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = poll_handle {
        if let Err(e) = handle.await {
            warn!("poll loop ended abnormally: {e}");
        }
    }
    info!("viewer stopped");
}
