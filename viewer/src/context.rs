use std::sync::Arc;

use msgs::{Maze, PlayerSnapshot};
use tokio::sync::Mutex;
use tracing::warn;

use crate::connection_status::ConnectionStatus;
use crate::error::OutOfBoundsError;
use crate::grid::GridModel;
use crate::poll_loop::PollState;
use crate::snapshot_diff::diff;
use crate::surface::RenderSurface;

/// Everything one viewer session keeps between poll cycles.
pub struct ViewerContext<S> {
    pub maze: Maze,
    pub grid: GridModel,
    pub surface: S,
    pub previous: PlayerSnapshot,
    pub status: ConnectionStatus,
    pub poll_state: PollState,
    pub cycles: u64,
}

pub type ViewerContextRef<S> = Arc<Mutex<ViewerContext<S>>>;

impl<S: RenderSurface> ViewerContext<S> {
    pub fn new(maze: Maze, grid: GridModel, surface: S) -> ViewerContext<S> {
        ViewerContext {
            maze,
            grid,
            surface,
            previous: PlayerSnapshot::empty(),
            status: ConnectionStatus::Connecting,
            poll_state: PollState::Idle,
            cycles: 0,
        }
    }

    pub fn into_ref(self) -> ViewerContextRef<S> {
        Arc::new(Mutex::new(self))
    }

    /// Replaces the shown snapshot with `current`. Returns the records that
    /// could not be placed on the grid.
    pub fn apply_snapshot(&mut self, current: PlayerSnapshot) -> Vec<OutOfBoundsError> {
        let skipped = diff(&self.previous, &current).apply(&mut self.grid, &mut self.surface);
        self.previous = current;
        self.cycles += 1;
        self.flush();
        skipped
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.surface.set_connection_status(&status);
        self.status = status;
        self.flush();
    }

    fn flush(&mut self) {
        if let Err(e) = self.surface.flush() {
            warn!("error while drawing: {e}");
        }
    }
}
