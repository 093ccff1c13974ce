mod node;
mod state;

pub(crate) use node::OpenNode;
pub use state::{replay_path, Flags, State};

use serde::Serialize;

/// Board coordinate as `(row, column)`.
pub type Position = (usize, usize);
pub type Offset = (isize, isize);
pub type Path = Vec<Position>;

/// Unit steps: axis-aligned first, then diagonals. The order pins path tie-breaking.
pub const MOVES: [Offset; 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

pub const AXIS_MOVES: [Offset; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Outcome of one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Found { cost: usize, path: Path },
    Unreachable,
}

impl SearchResult {
    pub fn cost(&self) -> Option<usize> {
        match self {
            SearchResult::Found { cost, .. } => Some(*cost),
            SearchResult::Unreachable => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchResult::Found { path, .. } => Some(path),
            SearchResult::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, SearchResult::Found { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteKind {
    Direct,
    ViaWaypoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Win {
        path: Path,
        cost: usize,
        route: RouteKind,
    },
    Lose,
}

impl RouteOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, RouteOutcome::Win { .. })
    }

    pub fn cost(&self) -> Option<usize> {
        match self {
            RouteOutcome::Win { cost, .. } => Some(*cost),
            RouteOutcome::Lose => None,
        }
    }
}
