use std::collections::BTreeSet;
use std::io;

use msgs::Coord;
use tracing::{debug, info, warn};

use crate::connection_status::ConnectionStatus;
use crate::grid::CellTags;
use crate::surface::{CellHandle, RenderSurface};

/// A surface with no screen: it keeps the visual state in memory and reports
/// changes through the log. Used by `--headless` and by the tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    info: Option<String>,
    cells: Vec<(Coord, CellTags)>,
    grid_ready: bool,
    label_panel: bool,
    labels: Vec<String>,
    status: Option<ConnectionStatus>,
    tag_updates: usize,
    flushes: usize,
}

impl HeadlessSurface {
    pub fn new() -> HeadlessSurface {
        HeadlessSurface::default()
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn tags_at(&self, coord: Coord) -> Option<CellTags> {
        self.cells.iter().find(|(at, _)| *at == coord).map(|(_, tags)| *tags)
    }

    pub fn insertion_order(&self) -> Vec<Coord> {
        self.cells.iter().map(|(coord, _)| *coord).collect()
    }

    pub fn marked_players(&self) -> BTreeSet<Coord> {
        self.cells
            .iter()
            .filter(|(_, tags)| tags.contains(CellTags::PLAYER))
            .map(|(coord, _)| *coord)
            .collect()
    }

    pub fn is_grid_ready(&self) -> bool {
        self.grid_ready
    }

    pub fn has_label_panel(&self) -> bool {
        self.label_panel
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn status(&self) -> Option<&ConnectionStatus> {
        self.status.as_ref()
    }

    pub fn tag_updates(&self) -> usize {
        self.tag_updates
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl RenderSurface for HeadlessSurface {
    fn show_info(&mut self, text: &str) {
        info!("{text}");
        self.info = Some(text.to_string());
    }

    fn clear_info(&mut self) {
        self.info = None;
    }

    fn begin_grid(&mut self, width: u32, height: u32) {
        self.cells.reserve(width as usize * height as usize);
    }

    fn insert_cell(&mut self, coord: Coord) -> CellHandle {
        self.cells.push((coord, CellTags::empty()));
        CellHandle(self.cells.len() - 1)
    }

    fn set_cell_tag(&mut self, cell: CellHandle, tag: CellTags, present: bool) {
        let Some((coord, tags)) = self.cells.get_mut(cell.0) else {
            warn!("tag update for unknown cell {}", cell.0);
            return;
        };
        tags.set(tag, present);
        self.tag_updates += 1;
        if self.grid_ready {
            debug!(x = coord.x, y = coord.y, ?tag, present, "cell updated");
        }
    }

    fn grid_ready(&mut self) {
        self.grid_ready = true;
        info!("maze laid out with {} cells", self.cells.len());
    }

    fn create_label_panel(&mut self) {
        self.label_panel = true;
    }

    fn set_label_list(&mut self, names: &[String]) {
        if self.labels != names {
            debug!(players = ?names, "player list changed");
        }
        self.labels = names.to_vec();
    }

    fn set_connection_status(&mut self, status: &ConnectionStatus) {
        let changed = match (&self.status, status) {
            (Some(ConnectionStatus::Connected { .. }), ConnectionStatus::Connected { .. }) => false,
            (Some(old), new) => old != new,
            (None, _) => true,
        };
        if changed {
            info!("{status}");
        }
        self.status = Some(status.clone());
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
