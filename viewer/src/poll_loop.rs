use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::connection_status::ConnectionStatus;
use crate::context::ViewerContextRef;
use crate::error::FetchError;
use crate::provider::PlayerProvider;
use crate::surface::RenderSurface;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_BACKOFF_INITIAL: Duration = Duration::from_millis(500);
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Applying,
    Scheduled,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
}

impl Default for PollConfig {
    fn default() -> PollConfig {
        PollConfig {
            interval: DEFAULT_POLL_INTERVAL,
            backoff_initial: DEFAULT_BACKOFF_INITIAL,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Applied { delay: Duration, skipped: usize },
    Retry { delay: Duration, error: FetchError },
}

impl CycleOutcome {
    pub fn delay(&self) -> Duration {
        match self {
            CycleOutcome::Applied { delay, .. } => *delay,
            CycleOutcome::Retry { delay, .. } => *delay,
        }
    }
}

/// Fetch → diff → apply → reschedule. The next fetch is only issued after
/// the previous cycle has finished, so fetches never overlap.
pub struct PollLoop<S> {
    context_ref: ViewerContextRef<S>,
    provider: Arc<dyn PlayerProvider>,
    config: PollConfig,
    backoff: Backoff,
}

impl<S: RenderSurface + Send + 'static> PollLoop<S> {
    pub fn new(context_ref: ViewerContextRef<S>, provider: Arc<dyn PlayerProvider>, config: PollConfig) -> PollLoop<S> {
        PollLoop {
            context_ref,
            provider,
            config,
            backoff: Backoff::new(config.backoff_initial, config.backoff_max),
        }
    }

    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.context_ref.lock().await.poll_state = PollState::Fetching;

        let result = self.provider.fetch_players().await;

        let mut context = self.context_ref.lock().await;
        let outcome = match result {
            Ok(current) => {
                context.poll_state = PollState::Applying;
                let skipped = context.apply_snapshot(current);
                for err in &skipped {
                    warn!("skipping player record: {err}");
                }
                if !context.status.is_connected() {
                    info!("player feed connected");
                }
                self.backoff.reset();
                context.set_status(ConnectionStatus::connected_now());
                debug!(cycle = context.cycles, players = context.previous.len(), "applied snapshot");
                CycleOutcome::Applied { delay: self.config.interval, skipped: skipped.len() }
            }
            Err(error) => {
                let delay = self.backoff.next_delay();
                warn!("error while fetching players: {error}, retrying in {}ms", delay.as_millis());
                context.set_status(ConnectionStatus::Disconnected {
                    failures: self.backoff.failures(),
                    retry_in: delay,
                    reason: error.to_string(),
                });
                CycleOutcome::Retry { delay, error }
            }
        };
        context.poll_state = PollState::Scheduled;
        outcome
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("polling players every {}ms", self.config.interval.as_millis());
        loop {
            if *shutdown.borrow() {
                break;
            }
            let outcome = self.run_cycle().await;
            tokio::select! {
                _ = tokio::time::sleep(outcome.delay()) => {}
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        self.context_ref.lock().await.poll_state = PollState::Stopped;
        info!("poll loop stopped");
    }
}

pub fn spawn_poll_loop<S: RenderSurface + Send + 'static>(
    context_ref: ViewerContextRef<S>,
    provider: Arc<dyn PlayerProvider>,
    config: PollConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let poll_loop = PollLoop::new(context_ref, provider, config);
    tokio::spawn(poll_loop.run(shutdown))
}
