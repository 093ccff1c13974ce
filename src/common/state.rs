use super::{Offset, Position};
use crate::map::Map;

/// One-way travel flags. Once a flag is set it stays set for the rest of the path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flags {
    pub has_collectible: bool,
    pub hazard_neutralized: bool,
}

impl Flags {
    pub const LAYERS: usize = 4;

    /// Every flag combination, in cost-field layer order.
    pub const ALL: [Flags; Flags::LAYERS] = [
        Flags {
            has_collectible: false,
            hazard_neutralized: false,
        },
        Flags {
            has_collectible: true,
            hazard_neutralized: false,
        },
        Flags {
            has_collectible: false,
            hazard_neutralized: true,
        },
        Flags {
            has_collectible: true,
            hazard_neutralized: true,
        },
    ];

    pub(crate) fn layer(self) -> usize {
        self.has_collectible as usize | (self.hazard_neutralized as usize) << 1
    }

    /// Flags held after standing on `position`: the waypoint hands out the collectible,
    /// and holding it next to the primary core neutralizes the hazard.
    pub fn settle(self, map: &Map, position: Position, moves: &[Offset]) -> Flags {
        let has_collectible = self.has_collectible || position == map.waypoint;
        let hazard_neutralized = self.hazard_neutralized
            || (has_collectible
                && moves
                    .iter()
                    .filter_map(|&offset| map.shift(position, offset))
                    .any(|neighbor| map.is_primary_core(neighbor)));

        Flags {
            has_collectible,
            hazard_neutralized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    pub position: Position,
    pub path_length: usize,
    pub flags: Flags,
}

impl State {
    pub fn start(map: &Map, position: Position, moves: &[Offset]) -> Self {
        State {
            position,
            path_length: 0,
            flags: Flags::default().settle(map, position, moves),
        }
    }

    pub fn can_enter(&self, map: &Map, to: Position) -> bool {
        map.is_passable(to, self.flags.hazard_neutralized)
    }

    /// Moves one step; legality is the caller's business.
    pub fn advance(&self, map: &Map, to: Position, moves: &[Offset]) -> State {
        State {
            position: to,
            path_length: self.path_length + 1,
            flags: self.flags.settle(map, to, moves),
        }
    }

    /// Legal one-step successors in movement-offset order.
    pub fn successors<'a>(
        &'a self,
        map: &'a Map,
        moves: &'a [Offset],
    ) -> impl Iterator<Item = State> + 'a {
        moves
            .iter()
            .filter_map(move |&offset| map.shift(self.position, offset))
            .filter(move |&neighbor| self.can_enter(map, neighbor))
            .map(move |neighbor| self.advance(map, neighbor, moves))
    }
}

/// Replays `path` from its first cell and returns the state reached at every step.
/// Returns `None` if a step is not one of `moves` or enters a cell the flags gathered so far
/// do not allow.
pub fn replay_path(map: &Map, path: &[Position], moves: &[Offset]) -> Option<Vec<State>> {
    let (&first, rest) = path.split_first()?;
    map.classify(first)?;

    let mut current = State::start(map, first, moves);
    let mut states = vec![current];
    for &next in rest {
        let adjacent = moves
            .iter()
            .any(|&offset| map.shift(current.position, offset) == Some(next));
        if !adjacent || !current.can_enter(map, next) {
            return None;
        }
        current = current.advance(map, next, moves);
        states.push(current);
    }
    Some(states)
}
