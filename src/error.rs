use std::fmt;

use thiserror::Error;

use crate::common::Position;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can be placed on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Agent,
    PrimaryHazard,
    SecondaryHazard,
    Obstacle,
    Waypoint,
    Goal,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Actor::Agent => "agent",
            Actor::PrimaryHazard => "primary hazard",
            Actor::SecondaryHazard => "secondary hazard",
            Actor::Obstacle => "obstacle",
            Actor::Waypoint => "waypoint",
            Actor::Goal => "goal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementIssue {
    #[error("cell is outside the board")]
    OutOfBounds,
    #[error("cell is already occupied")]
    Occupied,
    #[error("cell is inside a perception zone")]
    InsidePerceptionZone,
}

#[derive(Debug, Error)]
pub enum Error {
    /// An explicit placement broke one of the board invariants.
    #[error("{actor} invalid place {position:?}: {issue}")]
    InvalidPlacement {
        actor: Actor,
        position: Position,
        issue: PlacementIssue,
    },

    /// Random generation gave up on an actor.
    #[error("could not place {actor} after {attempts} random attempts")]
    GenerationExhausted { actor: Actor, attempts: usize },

    /// Path reconstruction found no predecessor. Never expected from a finished search.
    #[error("cost field has no predecessor for {position:?} at cost {cost}")]
    InconsistentCostField { position: Position, cost: usize },

    #[error("malformed scenario (line {line}): {message}")]
    MalformedScenario { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
