//! The rendering capability the grid model and poll loop draw through.
//!
//! The core never creates or removes visual nodes itself; it asks a
//! [`RenderSurface`] to insert one node per cell at bootstrap and afterwards
//! only toggles tags on the handles it was given back.

use std::io;

use msgs::Coord;

use crate::connection_status::ConnectionStatus;
use crate::grid::CellTags;

pub mod headless;
pub mod terminal;

/// Opaque reference to a cell node created by [`RenderSurface::insert_cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellHandle(pub usize);

pub trait RenderSurface {
    /// Replaces the text of the info line (loading placeholder or error).
    fn show_info(&mut self, text: &str);

    fn clear_info(&mut self);

    /// Called once before any cell is inserted.
    fn begin_grid(&mut self, width: u32, height: u32);

    /// Creates the node for one cell. Rows arrive top (highest `y`) first,
    /// `x` increasing within a row.
    fn insert_cell(&mut self, coord: Coord) -> CellHandle;

    fn set_cell_tag(&mut self, cell: CellHandle, tag: CellTags, present: bool);

    /// All cells and permanent tags are in place.
    fn grid_ready(&mut self);

    fn create_label_panel(&mut self);

    /// Replaces the whole label list, in the given order.
    fn set_label_list(&mut self, names: &[String]);

    fn set_connection_status(&mut self, status: &ConnectionStatus);

    /// Pushes any buffered changes out. Called once at the end of every apply.
    fn flush(&mut self) -> io::Result<()>;
}
