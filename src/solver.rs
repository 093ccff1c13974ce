use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::algorithm::{a_star_search, backtracking_search};
use crate::common::{Offset, Position, RouteKind, RouteOutcome, SearchResult, MOVES};
use crate::error::Result;
use crate::map::Map;
use crate::stat::Stats;

/// A single-leg shortest-path search over the augmented state space.
pub trait Solver {
    fn name(&self) -> &'static str;

    fn solve(
        &self,
        map: &Map,
        start: Position,
        goal: Position,
        moves: &[Offset],
        stats: &mut Stats,
    ) -> Result<SearchResult>;
}

/// Best-first search guided by the diagonal-distance heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl Solver for AStar {
    fn name(&self) -> &'static str {
        "AStar"
    }

    fn solve(
        &self,
        map: &Map,
        start: Position,
        goal: Position,
        moves: &[Offset],
        stats: &mut Stats,
    ) -> Result<SearchResult> {
        a_star_search(map, start, goal, moves, stats)
    }
}

/// Depth-first branch-and-bound that settles the whole cost field.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtracking;

impl Solver for Backtracking {
    fn name(&self) -> &'static str {
        "Backtracking"
    }

    fn solve(
        &self,
        map: &Map,
        start: Position,
        goal: Position,
        moves: &[Offset],
        stats: &mut Stats,
    ) -> Result<SearchResult> {
        backtracking_search(map, start, goal, moves, stats)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[value(name = "astar")]
    AStar,
    Backtracking,
    #[default]
    Both,
}

impl Algorithm {
    pub fn solvers(self) -> Vec<Box<dyn Solver>> {
        match self {
            Algorithm::AStar => vec![Box::new(AStar)],
            Algorithm::Backtracking => vec![Box::new(Backtracking)],
            Algorithm::Both => vec![Box::new(AStar), Box::new(Backtracking)],
        }
    }
}

/// Which route wins when the direct and the waypoint routes cost the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
    PreferDirect,
    #[default]
    PreferWaypoint,
}

/// Runs the direct search and both waypoint legs, then keeps the cheaper route.
#[instrument(skip_all, name = "compose_route", fields(solver = solver.name()), level = "debug")]
pub fn compose_route<S: Solver + ?Sized>(
    map: &Map,
    solver: &S,
    tie_policy: TiePolicy,
    stats: &mut Stats,
) -> Result<RouteOutcome> {
    let direct = solver.solve(map, map.start, map.goal, &MOVES, stats)?;
    let to_waypoint = solver.solve(map, map.start, map.waypoint, &MOVES, stats)?;
    let from_waypoint = solver.solve(map, map.waypoint, map.goal, &MOVES, stats)?;

    let via_cost = to_waypoint
        .cost()
        .zip(from_waypoint.cost())
        .map(|(first, second)| first + second);
    debug!(
        "direct cost {:?}, via waypoint cost {via_cost:?}",
        direct.cost()
    );

    let take_direct = match (direct.cost(), via_cost) {
        (None, None) => {
            info!("{}: Lose", solver.name());
            return Ok(RouteOutcome::Lose);
        }
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (Some(direct_cost), Some(via_cost)) => match tie_policy {
            TiePolicy::PreferDirect => direct_cost <= via_cost,
            TiePolicy::PreferWaypoint => direct_cost < via_cost,
        },
    };

    let outcome = match (take_direct, direct, to_waypoint, from_waypoint) {
        (true, SearchResult::Found { cost, path }, _, _) => RouteOutcome::Win {
            path,
            cost,
            route: RouteKind::Direct,
        },
        (
            false,
            _,
            SearchResult::Found {
                cost: first_cost,
                path: mut first,
            },
            SearchResult::Found {
                cost: second_cost,
                path: second,
            },
        ) => {
            // The waypoint closes the first leg and opens the second.
            first.pop();
            first.extend(second);
            RouteOutcome::Win {
                path: first,
                cost: first_cost + second_cost,
                route: RouteKind::ViaWaypoint,
            }
        }
        _ => RouteOutcome::Lose,
    };

    match &outcome {
        RouteOutcome::Win { cost, route, .. } => {
            info!("{}: Win with cost {cost} ({route:?})", solver.name())
        }
        RouteOutcome::Lose => info!("{}: Lose", solver.name()),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::replay_path;
    use crate::scenario::Placements;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    // The goal sits behind the primary hazard's zone, so every route has to pick up the
    // collectible and neutralize the hazard. Both routes cost 8.
    fn waypoint_map() -> Map {
        let placements = Placements {
            agent: (8, 8),
            secondary_hazard: (7, 1),
            primary_hazard: (1, 1),
            obstacle: (4, 8),
            goal: (0, 0),
            waypoint: (4, 4),
        };
        Map::from_placements(9, 9, &placements).unwrap()
    }

    // The goal corner is walled off by the roaming hazard's zone and the obstacle.
    fn sealed_map() -> Map {
        let placements = Placements {
            agent: (8, 0),
            secondary_hazard: (1, 2),
            primary_hazard: (6, 6),
            obstacle: (1, 0),
            goal: (0, 0),
            waypoint: (4, 2),
        };
        Map::from_placements(9, 9, &placements).unwrap()
    }

    #[test]
    fn test_route_through_waypoint() {
        init_tracing();
        let map = waypoint_map();
        for solver in Algorithm::Both.solvers() {
            let stats = &mut Stats::default();
            let outcome =
                compose_route(&map, solver.as_ref(), TiePolicy::PreferWaypoint, stats).unwrap();
            stats.print(solver.name());

            let RouteOutcome::Win { path, cost, route } = outcome else {
                panic!("{} lost a winnable map", solver.name());
            };
            assert_eq!(route, RouteKind::ViaWaypoint);
            assert_eq!(cost, 8);
            assert_eq!(path.len(), 9);
            assert_eq!(path.first(), Some(&map.start));
            assert_eq!(path.last(), Some(&map.goal));
            assert_eq!(path.iter().filter(|&&cell| cell == map.waypoint).count(), 1);
            assert!(path.contains(&map.primary_hazard));
            assert!(replay_path(&map, &path, &MOVES).is_some());
            assert_eq!(stats.searches, 3);
        }
    }

    #[test]
    fn test_tie_goes_to_direct_when_preferred() {
        init_tracing();
        let map = waypoint_map();
        let stats = &mut Stats::default();
        let outcome = compose_route(&map, &AStar, TiePolicy::PreferDirect, stats).unwrap();

        let RouteOutcome::Win { path, cost, route } = outcome else {
            panic!("lost a winnable map");
        };
        assert_eq!(route, RouteKind::Direct);
        assert_eq!(cost, 8);
        assert_eq!(path.len(), 9);
        assert!(replay_path(&map, &path, &MOVES).is_some());
    }

    #[test]
    fn test_sealed_goal_loses() {
        init_tracing();
        let map = sealed_map();
        for solver in Algorithm::Both.solvers() {
            let stats = &mut Stats::default();
            let outcome =
                compose_route(&map, solver.as_ref(), TiePolicy::default(), stats).unwrap();
            assert_eq!(outcome, RouteOutcome::Lose);
            assert_eq!(stats.searches, 3);
        }
    }

    #[test]
    fn test_solvers_agree_on_random_maps() {
        init_tracing();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..30 {
            let map = Map::generate(9, 9, &mut rng, 10_000).unwrap();
            let informed =
                compose_route(&map, &AStar, TiePolicy::default(), &mut Stats::default()).unwrap();
            let exhaustive =
                compose_route(&map, &Backtracking, TiePolicy::default(), &mut Stats::default())
                    .unwrap();
            assert_eq!(informed.cost(), exhaustive.cost());

            for outcome in [informed, exhaustive] {
                if let RouteOutcome::Win { path, cost, .. } = outcome {
                    assert_eq!(path.len(), cost + 1);
                    assert_eq!(path.first(), Some(&map.start));
                    assert_eq!(path.last(), Some(&map.goal));
                    assert!(replay_path(&map, &path, &MOVES).is_some(), "{path:?}");
                }
            }
        }
    }

    #[test]
    fn test_algorithm_selection() {
        let names: Vec<_> = Algorithm::Both.solvers().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["AStar", "Backtracking"]);
        assert_eq!(Algorithm::AStar.solvers().len(), 1);
        assert_eq!(
            Algorithm::from_str("astar", true).unwrap(),
            Algorithm::AStar
        );
        assert_eq!(
            TiePolicy::from_str("prefer-direct", true).unwrap(),
            TiePolicy::PreferDirect
        );
    }
}
