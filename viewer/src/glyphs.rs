use msgs::Coord;

use crate::grid::{CellTags, GridModel};

pub const PLAYER_GLYPH: &str = "▒▒";
pub const PRESENT_GLYPH: &str = "◆◆";
pub const EMPTY_GLYPH: &str = "  ";

/// Which neighbours of a wall cell continue the wall. The grid edge counts as
/// wall so outer walls join up with the border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallSides {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl WallSides {
    pub fn around(coord: Coord, width: u32, height: u32, is_wall: impl Fn(Coord) -> bool) -> WallSides {
        let (x, y) = (coord.x, coord.y);
        WallSides {
            north: y == height as i64 - 1 || is_wall(Coord::new(x, y + 1)),
            east: x == width as i64 - 1 || is_wall(Coord::new(x + 1, y)),
            south: y == 0 || is_wall(Coord::new(x, y - 1)),
            west: x == 0 || is_wall(Coord::new(x - 1, y)),
        }
    }
}

pub fn wall_glyph(sides: WallSides) -> &'static str {
    let WallSides { north, east, south, west } = sides;
    match (north, east, south, west) {
        (false, false, false, false) => "██",
        (true, true, true, true) => "┼┼",
        (true, false, false, false) => "└┘",
        (false, false, true, false) => "┌┐",
        (true, false, true, false) => "││",
        (false, _, false, _) => "──",
        (true, true, false, false) => "└┴",
        (false, true, true, false) => "┌┬",
        (false, false, true, true) => "┬┐",
        (true, false, false, true) => "┴┘",
        (true, true, true, false) => "├┼",
        (false, true, true, true) => "┬┬",
        (true, false, true, true) => "┼┤",
        (true, true, false, true) => "┴┴",
    }
}

/// Two-column glyph for a cell. A player hides whatever is underneath.
pub fn cell_glyph(tags: CellTags, sides: WallSides) -> &'static str {
    if tags.contains(CellTags::PLAYER) {
        PLAYER_GLYPH
    } else if tags.contains(CellTags::WALL) {
        wall_glyph(sides)
    } else if tags.contains(CellTags::PRESENT) {
        PRESENT_GLYPH
    } else {
        EMPTY_GLYPH
    }
}

/// Renders the grid as text, top row first. With `with_players` unset the
/// transient player tags are ignored.
pub fn render_text(grid: &GridModel, with_players: bool) -> String {
    let (width, height) = (grid.width(), grid.height());
    let mut output = String::with_capacity((width as usize * 2 + 1) * height as usize);
    for y in (0..height as i64).rev() {
        for x in 0..width as i64 {
            let coord = Coord::new(x, y);
            let mut tags = grid.tags(coord).unwrap_or_default();
            if !with_players {
                tags.remove(CellTags::PLAYER);
            }
            let sides = WallSides::around(coord, width, height, |at| grid.is_wall(at));
            output.push_str(cell_glyph(tags, sides));
        }
        output.push('\n');
    }
    output
}
