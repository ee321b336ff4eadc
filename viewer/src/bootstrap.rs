use tracing::{error, info};

use crate::context::ViewerContext;
use crate::error::BootstrapError;
use crate::grid::GridModel;
use crate::provider::MazeProvider;
use crate::surface::RenderSurface;

pub const LOADING_TEXT: &str = "Loading...";
pub const MAZE_ERROR_TEXT: &str = "Error loading maze data";

pub enum BootstrapOutcome<S> {
    Ready (ViewerContext<S>),
    /// The surface is handed back still showing the error message.
    Failed { surface: S, error: BootstrapError },
}

/// Shows the loading placeholder, fetches the maze once and lays it out.
/// There is no retry: a failure leaves the error message on screen.
pub async fn bootstrap<S: RenderSurface>(mut surface: S, provider: &dyn MazeProvider) -> BootstrapOutcome<S> {
    surface.show_info(LOADING_TEXT);

    let maze = match provider.fetch_maze().await {
        Ok(maze) => maze,
        Err(e) => return fail(surface, e.into()),
    };
    info!("loaded {}x{} maze with {} walls", maze.width, maze.height, maze.walls.len());

    surface.clear_info();
    let grid = match GridModel::build(&maze, &mut surface) {
        Ok(grid) => grid,
        Err(e) => return fail(surface, e.into()),
    };
    surface.create_label_panel();

    BootstrapOutcome::Ready(ViewerContext::new(maze, grid, surface))
}

fn fail<S: RenderSurface>(mut surface: S, error: BootstrapError) -> BootstrapOutcome<S> {
    error!("{error}");
    surface.show_info(MAZE_ERROR_TEXT);
    if let Err(e) = surface.flush() {
        error!("error while drawing: {e}");
    }
    BootstrapOutcome::Failed { surface, error }
}
