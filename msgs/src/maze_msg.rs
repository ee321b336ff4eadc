use anyhow::Context;

use crate::coord::Coord;

/// The immutable maze description returned once by `/maze`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maze {
    pub width: u32,
    pub height: u32,
    pub present_x: i64,
    pub present_y: i64,
    pub walls: Vec<[i64; 2]>,
}

impl Maze {
    pub fn decode(input_buffer: &[u8]) -> anyhow::Result<Maze> {
        let maze = serde_json::from_slice::<Maze>(input_buffer).context("malformed maze data")?;
        Ok(maze)
    }

    pub fn present(&self) -> Coord {
        Coord::new(self.present_x, self.present_y)
    }

    pub fn wall_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.walls.iter().map(|[x, y]| Coord::new(*x, *y))
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width as i64 && coord.y >= 0 && coord.y < self.height as i64
    }
}
