use super::{finish, CostField};
use crate::common::{Offset, Position, SearchResult, State};
use crate::error::Result;
use crate::map::Map;
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Depth-first branch-and-bound over the augmented states. A state is expanded only while it
/// improves its cost-field entry, so the field settles on exact distances once the stack is
/// empty. Goal states close their branch without being expanded.
#[instrument(skip_all, name = "backtracking", fields(start = format!("{start:?}"), goal = format!("{goal:?}")), level = "debug")]
pub(crate) fn backtracking_search(
    map: &Map,
    start: Position,
    goal: Position,
    moves: &[Offset],
    stats: &mut Stats,
) -> Result<SearchResult> {
    let started = Instant::now();
    stats.searches += 1;

    if map.classify(start).is_none() || map.classify(goal).is_none() {
        debug!("endpoint outside the board");
        return Ok(SearchResult::Unreachable);
    }

    let mut field = CostField::new(map);
    let mut stack = vec![State::start(map, start, moves)];

    while let Some(state) = stack.pop() {
        if state.position == goal {
            field.relax(goal, state.flags, state.path_length);
            continue;
        }

        if !field.relax(state.position, state.flags, state.path_length) {
            continue;
        }

        stats.expanded_nodes += 1;
        trace!("expand node: {state:?}");

        let successors: Vec<State> = state
            .successors(map, moves)
            .filter(|next| next.path_length < field.get(next.position, next.flags))
            .collect();
        // Reversed so the first movement offset is explored first.
        stack.extend(successors.into_iter().rev());
    }

    let result = finish(map, &field, moves, start, goal)?;
    match result.cost() {
        Some(cost) => debug!("found path of cost {cost}"),
        None => debug!("cannot find solution"),
    }

    stats.elapsed += started.elapsed();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::a_star_search;
    use crate::common::{replay_path, MOVES};
    use crate::scenario::Placements;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_backtracking_straight_line() {
        init_tracing();
        let placements = Placements {
            agent: (0, 0),
            secondary_hazard: (8, 8),
            primary_hazard: (8, 5),
            obstacle: (6, 8),
            goal: (0, 8),
            waypoint: (4, 0),
        };
        let map = Map::from_placements(9, 9, &placements).unwrap();
        let stats = &mut Stats::default();
        let result = backtracking_search(&map, map.start, map.goal, &MOVES, stats).unwrap();

        assert_eq!(result.cost(), Some(8));
        let path = result.path().unwrap();
        assert_eq!(path.len(), 9);
        assert!(replay_path(&map, path, &MOVES).is_some());
    }

    #[test]
    fn test_backtracking_start_is_goal() {
        let placements = Placements {
            agent: (0, 0),
            secondary_hazard: (8, 8),
            primary_hazard: (8, 5),
            obstacle: (6, 8),
            goal: (0, 8),
            waypoint: (4, 0),
        };
        let map = Map::from_placements(9, 9, &placements).unwrap();
        let stats = &mut Stats::default();
        let result = backtracking_search(&map, (2, 2), (2, 2), &MOVES, stats).unwrap();
        assert_eq!(
            result,
            SearchResult::Found {
                cost: 0,
                path: vec![(2, 2)]
            }
        );
    }

    #[test]
    fn test_backtracking_unreachable_goal() {
        init_tracing();
        let placements = Placements {
            agent: (8, 0),
            secondary_hazard: (1, 2),
            primary_hazard: (6, 6),
            obstacle: (1, 0),
            goal: (0, 0),
            waypoint: (4, 2),
        };
        let map = Map::from_placements(9, 9, &placements).unwrap();
        let stats = &mut Stats::default();
        let result = backtracking_search(&map, map.start, map.goal, &MOVES, stats).unwrap();
        assert_eq!(result, SearchResult::Unreachable);
    }

    #[test]
    fn test_agrees_with_a_star_on_random_maps() {
        init_tracing();
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let map = Map::generate(9, 9, &mut rng, 10_000).unwrap();
            let starts = [map.start, map.waypoint];

            for start in starts {
                for (goal, _) in map.cells() {
                    let informed =
                        a_star_search(&map, start, goal, &MOVES, &mut Stats::default()).unwrap();
                    let exhaustive =
                        backtracking_search(&map, start, goal, &MOVES, &mut Stats::default())
                            .unwrap();
                    assert_eq!(
                        informed.cost(),
                        exhaustive.cost(),
                        "seed {seed}: {start:?} -> {goal:?}"
                    );

                    for result in [&informed, &exhaustive] {
                        if let SearchResult::Found { cost, path } = result {
                            assert_eq!(path.len(), cost + 1);
                            assert_eq!(path.first(), Some(&start));
                            assert_eq!(path.last(), Some(&goal));
                            assert!(
                                replay_path(&map, path, &MOVES).is_some(),
                                "seed {seed}: invalid path {path:?}"
                            );
                        }
                    }
                }
            }
        }
    }
}
