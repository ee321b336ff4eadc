use std::fmt;

use msgs::Coord;

/// A data endpoint could not be reached or did not return usable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Transport (String),
    Timeout,
    Status (u16),
    Decode (String),
}

impl FetchError {
    pub fn from_reqwest(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            return FetchError::Timeout;
        }
        if let Some(status) = err.status() {
            return FetchError::Status(status.as_u16());
        }
        FetchError::Transport(err.to_string())
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(reason) => write!(f, "server unreachable: {reason}"),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Status(code) => write!(f, "server responded with status {code}"),
            FetchError::Decode(reason) => write!(f, "invalid response: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A maze or player record referenced a cell outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBoundsError {
    pub coord: Coord,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for OutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell ({}) is outside the {}x{} grid", self.coord, self.width, self.height)
    }
}

impl std::error::Error for OutOfBoundsError {}

/// The maze could not be laid out as a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    OutOfBounds (OutOfBoundsError),
    TooLarge { width: u32, height: u32, max_cells: u64 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds(err) => write!(f, "{err}"),
            GridError::TooLarge { width, height, max_cells } => {
                write!(f, "{width}x{height} grid exceeds the limit of {max_cells} cells")
            }
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::OutOfBounds(err) => Some(err),
            GridError::TooLarge { .. } => None,
        }
    }
}

impl From<OutOfBoundsError> for GridError {
    fn from(err: OutOfBoundsError) -> GridError {
        GridError::OutOfBounds(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    Fetch (FetchError),
    Grid (GridError),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Fetch(err) => write!(f, "could not fetch maze: {err}"),
            BootstrapError::Grid(err) => write!(f, "maze rejected: {err}"),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BootstrapError::Fetch(err) => Some(err),
            BootstrapError::Grid(err) => Some(err),
        }
    }
}

impl From<FetchError> for BootstrapError {
    fn from(err: FetchError) -> BootstrapError {
        BootstrapError::Fetch(err)
    }
}

impl From<GridError> for BootstrapError {
    fn from(err: GridError) -> BootstrapError {
        BootstrapError::Grid(err)
    }
}
