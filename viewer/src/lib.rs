//! Terminal viewer for the reindeer maze: lays the maze out once, then keeps
//! polling the server for player positions and redraws only what moved.

pub mod backoff;
pub mod bootstrap;
pub mod config;
pub mod connection_status;
pub mod console_cmd;
pub mod console_input;
pub mod context;
pub mod error;
pub mod glyphs;
pub mod grid;
pub mod logging;
pub mod poll_loop;
pub mod provider;
pub mod snapshot_diff;
pub mod surface;
