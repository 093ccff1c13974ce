use std::cmp::Ordering;

use super::State;

/// Frontier entry for the informed search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct OpenNode {
    pub(crate) state: State,
    pub(crate) f_cost: usize,
    pub(crate) h_cost: usize,
}

impl OpenNode {
    pub(crate) fn new(state: State, h_cost: usize) -> Self {
        OpenNode {
            state,
            f_cost: state.path_length + h_cost,
            h_cost,
        }
    }
}

// Reversed so the max-heap pops the lowest f first.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .cmp(&self.f_cost)
            // Closer to the goal wins a tie on f.
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.state.position.cmp(&self.state.position))
            .then_with(|| other.state.flags.cmp(&self.state.flags))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
