use std::cell::Cell;

use pumpkin_core::termination::TerminationCondition;

/// Stops the search once the solution callback has seen a solution within the absolute gap.
#[derive(Clone, Copy, Debug)]
pub(super) struct GapLimit<'a> {
    reached: &'a Cell<bool>,
}

impl<'a> GapLimit<'a> {
    pub(super) fn new(reached: &'a Cell<bool>) -> Self {
        GapLimit { reached }
    }
}

impl TerminationCondition for GapLimit<'_> {
    fn should_stop(&mut self) -> bool {
        self.reached.get()
    }
}

/// Whether `objective_value` is close enough to `lower_bound` to stop searching.
pub(super) fn is_within_gap(objective_value: i64, lower_bound: i64, gap_limit: Option<i64>) -> bool {
    gap_limit.is_some_and(|gap_limit| objective_value - lower_bound <= gap_limit)
}
