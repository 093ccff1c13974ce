mod astar;
mod backtracking;

pub(crate) use astar::a_star_search;
pub(crate) use backtracking::backtracking_search;

use crate::common::{Flags, Offset, Path, Position, SearchResult};
use crate::error::{Error, Result};
use crate::map::Map;

/// Cost-field sentinel for states no search has reached.
pub const UNREACHABLE: usize = usize::MAX;

/// Diagonal (Chebyshev) distance: exact on an open board under 8-directional unit moves.
pub fn heuristic(from: Position, to: Position) -> usize {
    from.0.abs_diff(to.0).max(from.1.abs_diff(to.1))
}

/// Minimal known path lengths from one start, one layer per flag combination.
#[derive(Debug, Clone)]
pub struct CostField {
    columns: usize,
    costs: Vec<[usize; Flags::LAYERS]>,
}

impl CostField {
    pub fn new(map: &Map) -> Self {
        CostField {
            columns: map.columns,
            costs: vec![[UNREACHABLE; Flags::LAYERS]; map.rows * map.columns],
        }
    }

    pub fn get(&self, position: Position, flags: Flags) -> usize {
        self.costs[self.index(position)][flags.layer()]
    }

    /// Records `cost` if it beats the current entry.
    pub(crate) fn relax(&mut self, position: Position, flags: Flags, cost: usize) -> bool {
        let index = self.index(position);
        let entry = &mut self.costs[index][flags.layer()];
        if cost < *entry {
            *entry = cost;
            true
        } else {
            false
        }
    }

    /// Cheapest entry at `position` over all flag layers.
    pub fn best(&self, position: Position) -> Option<(usize, Flags)> {
        Flags::ALL
            .into_iter()
            .map(|flags| (self.get(position, flags), flags))
            .filter(|&(cost, _)| cost != UNREACHABLE)
            .min_by_key(|&(cost, _)| cost)
    }

    fn index(&self, position: Position) -> usize {
        position.0 * self.columns + position.1
    }
}

/// Walks the cost field backward from the goal state. Every step moves to a neighbour state
/// whose cost is exactly one less and that can legally produce the current state; the first
/// match in offset order, then layer order, wins.
pub(crate) fn construct_path(
    map: &Map,
    field: &CostField,
    moves: &[Offset],
    start: Position,
    goal: (Position, Flags),
) -> Result<Path> {
    let (mut position, mut flags) = goal;
    let mut cost = field.get(position, flags);
    let mut path = vec![position];

    while cost > 0 {
        let predecessor = moves
            .iter()
            .filter_map(|&offset| map.shift(position, offset))
            .find_map(|previous| {
                Flags::ALL
                    .into_iter()
                    .find(|&previous_flags| {
                        field.get(previous, previous_flags) == cost - 1
                            && map.is_passable(position, previous_flags.hazard_neutralized)
                            && previous_flags.settle(map, position, moves) == flags
                    })
                    .map(|previous_flags| (previous, previous_flags))
            });

        let Some((previous, previous_flags)) = predecessor else {
            return Err(Error::InconsistentCostField { position, cost });
        };
        path.push(previous);
        position = previous;
        flags = previous_flags;
        cost -= 1;
    }

    if position != start {
        return Err(Error::InconsistentCostField { position, cost });
    }

    path.reverse();
    Ok(path)
}

/// Turns a finished cost field into a result for `goal`.
pub(crate) fn finish(
    map: &Map,
    field: &CostField,
    moves: &[Offset],
    start: Position,
    goal: Position,
) -> Result<SearchResult> {
    match field.best(goal) {
        Some((cost, flags)) => Ok(SearchResult::Found {
            cost,
            path: construct_path(map, field, moves, start, (goal, flags))?,
        }),
        None => Ok(SearchResult::Unreachable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{State, MOVES};
    use crate::scenario::Placements;
    use std::collections::VecDeque;

    fn open_map() -> Map {
        // Everything lethal sits in the bottom-right corner.
        let placements = Placements {
            agent: (0, 0),
            secondary_hazard: (8, 8),
            primary_hazard: (8, 5),
            obstacle: (6, 8),
            goal: (0, 8),
            waypoint: (4, 0),
        };
        Map::from_placements(9, 9, &placements).unwrap()
    }

    // Plain breadth-first distances over cells that are passable without any flags.
    fn bfs(map: &Map, from: Position) -> Vec<Vec<Option<usize>>> {
        let mut distance = vec![vec![None; map.columns]; map.rows];
        let mut queue = VecDeque::from([from]);
        distance[from.0][from.1] = Some(0);
        while let Some(current) = queue.pop_front() {
            let next_distance = distance[current.0][current.1].map(|d| d + 1);
            for offset in MOVES {
                let Some(next) = map.shift(current, offset) else {
                    continue;
                };
                if map.is_passable(next, false) && distance[next.0][next.1].is_none() {
                    distance[next.0][next.1] = next_distance;
                    queue.push_back(next);
                }
            }
        }
        distance
    }

    #[test]
    fn test_heuristic_is_diagonal_distance() {
        assert_eq!(heuristic((0, 0), (0, 0)), 0);
        assert_eq!(heuristic((0, 0), (3, 5)), 5);
        assert_eq!(heuristic((7, 2), (1, 4)), 6);
    }

    #[test]
    fn test_heuristic_never_overestimates() {
        let map = open_map();
        for (from, _) in map.cells().filter(|&(p, _)| map.is_passable(p, false)) {
            let distance = bfs(&map, from);
            for (to, _) in map.cells() {
                if let Some(exact) = distance[to.0][to.1] {
                    assert!(heuristic(from, to) <= exact, "{from:?} -> {to:?}");
                }
            }
        }
    }

    #[test]
    fn test_heuristic_exact_on_open_area() {
        let map = open_map();
        let distance = bfs(&map, (0, 0));
        for to in [(0, 8), (3, 3), (5, 2), (4, 7)] {
            assert_eq!(distance[to.0][to.1], Some(heuristic((0, 0), to)));
        }
    }

    #[test]
    fn test_relax_and_best() {
        let map = open_map();
        let mut field = CostField::new(&map);
        let carrying = Flags {
            has_collectible: true,
            hazard_neutralized: false,
        };
        assert_eq!(field.best((2, 2)), None);
        assert!(field.relax((2, 2), carrying, 5));
        assert!(!field.relax((2, 2), carrying, 5));
        assert!(field.relax((2, 2), Flags::default(), 4));
        assert_eq!(field.get((2, 2), carrying), 5);
        assert_eq!(field.best((2, 2)), Some((4, Flags::default())));
    }

    #[test]
    fn test_construct_path_follows_decrements() {
        let map = open_map();
        let mut field = CostField::new(&map);
        let start = State::start(&map, (0, 0), &MOVES);
        let mut state = start;
        field.relax(state.position, state.flags, 0);
        for next in [(1, 1), (2, 2), (2, 3)] {
            state = state.advance(&map, next, &MOVES);
            field.relax(state.position, state.flags, state.path_length);
        }

        let path = construct_path(&map, &field, &MOVES, (0, 0), ((2, 3), state.flags)).unwrap();
        assert_eq!(path, vec![(0, 0), (1, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_construct_path_reports_gap() {
        let map = open_map();
        let mut field = CostField::new(&map);
        field.relax((0, 0), Flags::default(), 0);
        field.relax((3, 3), Flags::default(), 3);

        let result = construct_path(&map, &field, &MOVES, (0, 0), ((3, 3), Flags::default()));
        assert!(matches!(
            result,
            Err(Error::InconsistentCostField {
                position: (3, 3),
                cost: 3
            })
        ));
    }
}
