use anyhow::Context;

use crate::coord::Coord;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub name: String,
    pub x: i64,
    pub y: i64,
}

impl Player {
    pub fn new(name: impl Into<String>, x: i64, y: i64) -> Player {
        Player { name: name.into(), x, y }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Every player the server knew about at one poll, in server order.
/// Names and positions are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PlayerSnapshot {
    pub players: Vec<Player>,
}

impl PlayerSnapshot {
    pub fn new(players: Vec<Player>) -> PlayerSnapshot {
        PlayerSnapshot { players }
    }

    pub fn empty() -> PlayerSnapshot {
        PlayerSnapshot { players: Vec::new() }
    }

    pub fn decode(input_buffer: &[u8]) -> anyhow::Result<PlayerSnapshot> {
        let snapshot = serde_json::from_slice::<PlayerSnapshot>(input_buffer).context("malformed player data")?;
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.players.iter()
    }
}

impl From<Vec<Player>> for PlayerSnapshot {
    fn from(players: Vec<Player>) -> PlayerSnapshot {
        PlayerSnapshot { players }
    }
}

impl<'a> IntoIterator for &'a PlayerSnapshot {
    type Item = &'a Player;
    type IntoIter = std::slice::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}
