use super::{construct_path, heuristic, CostField};
use crate::common::{Offset, OpenNode, Position, SearchResult, State};
use crate::error::Result;
use crate::map::Map;
use crate::stat::Stats;

use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::{debug, instrument, trace};

#[instrument(skip_all, name = "a_star", fields(start = format!("{start:?}"), goal = format!("{goal:?}")), level = "debug")]
pub(crate) fn a_star_search(
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
    let mut open_list = BinaryHeap::new();

    let start_state = State::start(map, start, moves);
    field.relax(start, start_state.flags, 0);
    open_list.push(OpenNode::new(start_state, heuristic(start, goal)));

    let mut reached = None;
    while let Some(current) = open_list.pop() {
        let state = current.state;

        // A cheaper copy of this state was pushed after this one.
        if state.path_length > field.get(state.position, state.flags) {
            continue;
        }

        stats.expanded_nodes += 1;
        trace!("expand node: {state:?}");

        if state.position == goal {
            reached = Some(state);
            break;
        }

        // Flags come from the state being expanded, not from whatever the field holds.
        for next in state.successors(map, moves) {
            if field.relax(next.position, next.flags, next.path_length) {
                open_list.push(OpenNode::new(next, heuristic(next.position, goal)));
            }
        }
    }

    let result = match reached {
        Some(state) => {
            let path = construct_path(map, &field, moves, start, (goal, state.flags))?;
            debug!("found path of cost {}", state.path_length);
            SearchResult::Found {
                cost: state.path_length,
                path,
            }
        }
        None => {
            debug!("cannot find solution");
            SearchResult::Unreachable
        }
    };

    stats.elapsed += started.elapsed();
    Ok(result)
}
