use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::poll_loop::PollConfig;

pub const DEFAULT_SERVER: &str = "http://localhost:3001";
const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
const DEFAULT_BACKOFF_INITIAL_MS: u64 = 500;
const DEFAULT_BACKOFF_MAX_MS: u64 = 5_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// Live view of the reindeer maze and everyone moving through it.
#[derive(Debug, Clone, Parser)]
#[command(name = "maze-viewer", version, long_about = None)]
pub struct ViewerConfig {
    /// Base URL of the maze server's web port.
    #[arg(long, value_name = "URL", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Milliseconds to wait after a successful update before polling again.
    #[arg(
        long = "poll-interval-ms",
        value_name = "MILLISECONDS",
        default_value_t = DEFAULT_POLL_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..=60_000)
    )]
    pub poll_interval_ms: u64,

    /// First retry delay after a failed poll. Doubles on every further failure.
    #[arg(
        long = "backoff-initial-ms",
        value_name = "MILLISECONDS",
        default_value_t = DEFAULT_BACKOFF_INITIAL_MS,
        value_parser = clap::value_parser!(u64).range(1..=60_000)
    )]
    pub backoff_initial_ms: u64,

    /// Upper bound for the retry delay.
    #[arg(
        long = "backoff-max-ms",
        value_name = "MILLISECONDS",
        default_value_t = DEFAULT_BACKOFF_MAX_MS,
        value_parser = clap::value_parser!(u64).range(1..=600_000)
    )]
    pub backoff_max_ms: u64,

    /// Give up on a single request after this long.
    #[arg(
        long = "request-timeout-ms",
        value_name = "MILLISECONDS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..=60_000)
    )]
    pub request_timeout_ms: u64,

    /// Report changes through the log instead of drawing in the terminal.
    /// Reads `maze`, `players`, `show` and `quit` commands from stdin.
    #[arg(long)]
    pub headless: bool,

    /// Where to write log lines while the terminal view is active.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl ViewerConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            backoff_initial: Duration::from_millis(self.backoff_initial_ms),
            backoff_max: Duration::from_millis(self.backoff_max_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
