//! Wire types served by the maze server's `/maze` and `/players` endpoints.

pub mod coord;
pub mod maze_msg;
pub mod player_msg;

pub use coord::Coord;
pub use maze_msg::Maze;
pub use player_msg::{Player, PlayerSnapshot};
