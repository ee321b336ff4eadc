use std::collections::BTreeSet;

use bitflags::bitflags;
use msgs::{Coord, Maze};

use crate::error::{GridError, OutOfBoundsError};
use crate::surface::{CellHandle, RenderSurface};

/// Largest maze accepted, in cells. Anything bigger is refused before any
/// memory is reserved for it.
pub const MAX_CELLS: u64 = 1 << 20;

bitflags! {
    /// Visual markers carried by a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellTags: u8 {
        /// The goal cell. Permanent.
        const PRESENT = 1 << 0;
        /// Impassable cell. Permanent.
        const WALL = 1 << 1;
        /// At least one player stands here. Toggled every poll cycle.
        const PLAYER = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy)]
struct GridCell {
    handle: CellHandle,
    tags: CellTags,
}

/// Addressable per-cell render targets mirroring the maze, indexed `[y][x]`.
///
/// Handles are created once in [`GridModel::build`] and never recreated, so
/// later updates only ever touch the cells whose tags change.
#[derive(Debug, Clone)]
pub struct GridModel {
    width: u32,
    height: u32,
    rows: Vec<Vec<GridCell>>,
}

impl GridModel {
    pub fn build<S: RenderSurface + ?Sized>(maze: &Maze, surface: &mut S) -> Result<GridModel, GridError> {
        let out_of_bounds = |coord: Coord| OutOfBoundsError { coord, width: maze.width, height: maze.height };

        if maze.width as u64 * maze.height as u64 > MAX_CELLS {
            return Err(GridError::TooLarge { width: maze.width, height: maze.height, max_cells: MAX_CELLS });
        }
        if !maze.contains(maze.present()) {
            return Err(out_of_bounds(maze.present()).into());
        }
        if let Some(wall) = maze.wall_coords().find(|wall| !maze.contains(*wall)) {
            return Err(out_of_bounds(wall).into());
        }

        let width = maze.width as usize;
        let height = maze.height as usize;

        surface.begin_grid(maze.width, maze.height);

        let mut rows: Vec<Vec<GridCell>> = vec![Vec::new(); height];
        for y in (0..height).rev() {
            let row = &mut rows[y];
            row.reserve_exact(width);
            for x in 0..width {
                let handle = surface.insert_cell(Coord::new(x as i64, y as i64));
                row.push(GridCell { handle, tags: CellTags::empty() });
            }
        }

        let mut grid = GridModel {
            width: maze.width,
            height: maze.height,
            rows,
        };

        grid.set_tag(maze.present(), CellTags::PRESENT, true, surface)?;
        for wall in maze.wall_coords() {
            grid.set_tag(wall, CellTags::WALL, true, surface)?;
        }

        surface.grid_ready();
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width as i64 && coord.y >= 0 && coord.y < self.height as i64
    }

    pub fn handle(&self, coord: Coord) -> Option<CellHandle> {
        self.cell(coord).map(|cell| cell.handle)
    }

    pub fn tags(&self, coord: Coord) -> Option<CellTags> {
        self.cell(coord).map(|cell| cell.tags)
    }

    pub fn is_wall(&self, coord: Coord) -> bool {
        self.tags(coord).is_some_and(|tags| tags.contains(CellTags::WALL))
    }

    pub fn mark_player<S: RenderSurface + ?Sized>(&mut self, coord: Coord, surface: &mut S) -> Result<(), OutOfBoundsError> {
        self.set_tag(coord, CellTags::PLAYER, true, surface)
    }

    pub fn unmark_player<S: RenderSurface + ?Sized>(&mut self, coord: Coord, surface: &mut S) -> Result<(), OutOfBoundsError> {
        self.set_tag(coord, CellTags::PLAYER, false, surface)
    }

    /// Coordinates of every cell currently tagged `player`.
    pub fn player_cells(&self) -> BTreeSet<Coord> {
        let mut marked = BTreeSet::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.tags.contains(CellTags::PLAYER) {
                    marked.insert(Coord::new(x as i64, y as i64));
                }
            }
        }
        marked
    }

    fn cell(&self, coord: Coord) -> Option<&GridCell> {
        if !self.contains(coord) {
            return None;
        }
        Some(&self.rows[coord.y as usize][coord.x as usize])
    }

    fn set_tag<S: RenderSurface + ?Sized>(&mut self, coord: Coord, tag: CellTags, present: bool, surface: &mut S) -> Result<(), OutOfBoundsError> {
        if !self.contains(coord) {
            return Err(OutOfBoundsError { coord, width: self.width, height: self.height });
        }
        let cell = &mut self.rows[coord.y as usize][coord.x as usize];
        if cell.tags.contains(tag) == present {
            return Ok(());
        }
        cell.tags.set(tag, present);
        surface.set_cell_tag(cell.handle, tag, present);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::headless::HeadlessSurface;
    use proptest::prelude::*;

    fn scenario_a() -> Maze {
        Maze { width: 3, height: 2, present_x: 2, present_y: 0, walls: vec![[1, 0]] }
    }

    #[test]
    fn scenario_a_tags_present_and_wall() {
        let mut surface = HeadlessSurface::new();
        let grid = GridModel::build(&scenario_a(), &mut surface).unwrap();

        assert_eq!(grid.tags(Coord::new(2, 0)), Some(CellTags::PRESENT));
        assert_eq!(grid.tags(Coord::new(1, 0)), Some(CellTags::WALL));
        let untagged = [(0, 0), (0, 1), (1, 1), (2, 1)];
        for (x, y) in untagged {
            assert_eq!(grid.tags(Coord::new(x, y)), Some(CellTags::empty()));
            assert_eq!(surface.tags_at(Coord::new(x, y)), Some(CellTags::empty()));
        }
        assert_eq!(surface.tags_at(Coord::new(2, 0)), Some(CellTags::PRESENT));
        assert!(surface.is_grid_ready());
    }

    #[test]
    fn cells_are_inserted_top_row_first() {
        let mut surface = HeadlessSurface::new();
        GridModel::build(&scenario_a(), &mut surface).unwrap();

        let order = surface.insertion_order();
        assert_eq!(
            order,
            vec![
                Coord::new(0, 1),
                Coord::new(1, 1),
                Coord::new(2, 1),
                Coord::new(0, 0),
                Coord::new(1, 0),
                Coord::new(2, 0),
            ]
        );
    }

    #[test]
    fn rejected_maze_touches_nothing() {
        let mut surface = HeadlessSurface::new();
        let maze = Maze { width: 3, height: 2, present_x: 0, present_y: 0, walls: vec![[1, 0], [3, 1]] };
        let err = GridModel::build(&maze, &mut surface).unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds(OutOfBoundsError { coord, .. }) if coord == Coord::new(3, 1)));
        assert!(surface.insertion_order().is_empty());
    }

    #[test]
    fn oversized_maze_is_refused_before_allocating() {
        let mut surface = HeadlessSurface::new();
        let maze = Maze { width: u32::MAX, height: u32::MAX, present_x: 0, present_y: 0, walls: Vec::new() };
        let err = GridModel::build(&maze, &mut surface).unwrap_err();
        assert_eq!(err, GridError::TooLarge { width: u32::MAX, height: u32::MAX, max_cells: MAX_CELLS });
        assert!(surface.insertion_order().is_empty());
        assert!(!surface.is_grid_ready());
    }

    #[test]
    fn maze_at_the_cell_limit_builds() {
        let mut surface = HeadlessSurface::new();
        let maze = Maze { width: 1 << 10, height: 1 << 10, present_x: 0, present_y: 0, walls: Vec::new() };
        let grid = GridModel::build(&maze, &mut surface).unwrap();
        assert_eq!(grid.width() as u64 * grid.height() as u64, MAX_CELLS);
    }

    #[test]
    fn present_outside_grid_is_rejected() {
        let mut surface = HeadlessSurface::new();
        let maze = Maze { width: 3, height: 2, present_x: 1, present_y: 2, walls: Vec::new() };
        let err = GridModel::build(&maze, &mut surface).unwrap_err();
        assert_eq!(err, GridError::OutOfBounds(OutOfBoundsError { coord: Coord::new(1, 2), width: 3, height: 2 }));
    }

    #[test]
    fn mark_and_unmark_toggle_player_tag() {
        let mut surface = HeadlessSurface::new();
        let mut grid = GridModel::build(&scenario_a(), &mut surface).unwrap();

        grid.mark_player(Coord::new(2, 0), &mut surface).unwrap();
        assert_eq!(grid.tags(Coord::new(2, 0)), Some(CellTags::PRESENT | CellTags::PLAYER));
        assert_eq!(surface.tags_at(Coord::new(2, 0)), Some(CellTags::PRESENT | CellTags::PLAYER));

        grid.unmark_player(Coord::new(2, 0), &mut surface).unwrap();
        assert_eq!(grid.tags(Coord::new(2, 0)), Some(CellTags::PRESENT));
        assert!(grid.player_cells().is_empty());
    }

    #[test]
    fn marking_twice_only_reaches_surface_once() {
        let mut surface = HeadlessSurface::new();
        let mut grid = GridModel::build(&scenario_a(), &mut surface).unwrap();
        let before = surface.tag_updates();

        grid.mark_player(Coord::new(0, 1), &mut surface).unwrap();
        grid.mark_player(Coord::new(0, 1), &mut surface).unwrap();
        assert_eq!(surface.tag_updates(), before + 1);
    }

    #[test]
    fn player_outside_grid_is_rejected() {
        let mut surface = HeadlessSurface::new();
        let mut grid = GridModel::build(&scenario_a(), &mut surface).unwrap();
        assert!(grid.mark_player(Coord::new(-1, 0), &mut surface).is_err());
        assert!(grid.unmark_player(Coord::new(0, 2), &mut surface).is_err());
    }

    proptest! {
        #[test]
        fn any_coordinate_outside_grid_fails_build(
            width in 1u32..12,
            height in 1u32..12,
            dx in -5i64..5,
            dy in -5i64..5,
            as_wall in any::<bool>(),
        ) {
            // Push the point outside on at least one axis.
            let x = if dx < 0 { dx } else { width as i64 + dx };
            let y = dy.rem_euclid(height as i64);
            let maze = if as_wall {
                Maze { width, height, present_x: 0, present_y: 0, walls: vec![[x, y]] }
            } else {
                Maze { width, height, present_x: x, present_y: y, walls: Vec::new() }
            };
            let mut surface = HeadlessSurface::new();
            let err = GridModel::build(&maze, &mut surface).unwrap_err();
            let expected = OutOfBoundsError { coord: Coord::new(x, y), width, height };
            prop_assert_eq!(err, GridError::OutOfBounds(expected));
        }

        #[test]
        fn in_bounds_maze_always_builds(
            width in 1u32..12,
            height in 1u32..12,
            walls in proptest::collection::vec((0u32..12, 0u32..12), 0..20),
        ) {
            let walls = walls
                .into_iter()
                .map(|(x, y)| [(x % width) as i64, (y % height) as i64])
                .collect::<Vec<_>>();
            let maze = Maze { width, height, present_x: 0, present_y: 0, walls };
            let mut surface = HeadlessSurface::new();
            let grid = GridModel::build(&maze, &mut surface).unwrap();
            prop_assert_eq!(surface.insertion_order().len(), (width * height) as usize);
            for [x, y] in &maze.walls {
                prop_assert!(grid.is_wall(Coord::new(*x, *y)));
            }
        }
    }
}
