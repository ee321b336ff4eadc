use msgs::{Coord, PlayerSnapshot};

use crate::error::OutOfBoundsError;
use crate::grid::GridModel;
use crate::surface::RenderSurface;

/// The visual change between two consecutive player snapshots.
///
/// Players are not matched between snapshots: every previous position is
/// unmarked and every current position is marked. Unmarking always runs
/// first, so the grid ends up showing exactly the current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub to_unmark: Vec<Coord>,
    pub to_mark: Vec<Coord>,
    pub labels: Vec<String>,
}

pub fn diff(previous: &PlayerSnapshot, current: &PlayerSnapshot) -> SnapshotDiff {
    SnapshotDiff {
        to_unmark: previous.iter().map(|player| player.coord()).collect(),
        to_mark: current.iter().map(|player| player.coord()).collect(),
        labels: current.iter().map(|player| player.name.clone()).collect(),
    }
}

impl SnapshotDiff {
    /// Applies the diff in one pass: unmark all, mark all, then rebuild the
    /// label list. Out-of-bounds records are skipped and handed back.
    pub fn apply<S: RenderSurface + ?Sized>(&self, grid: &mut GridModel, surface: &mut S) -> Vec<OutOfBoundsError> {
        for coord in &self.to_unmark {
            // Anything out of bounds here was already reported when it was marked.
            let _ = grid.unmark_player(*coord, surface);
        }

        let mut skipped = Vec::new();
        for coord in &self.to_mark {
            if let Err(err) = grid.mark_player(*coord, surface) {
                skipped.push(err);
            }
        }

        surface.set_label_list(&self.labels);
        skipped
    }
}
