//! The contract between a model and whatever engine solves it.
use std::time::Duration;

use crate::model::Model;
use crate::results::SolutionProgress;
use crate::results::SolveOutcome;

/// An engine which turns a [`Model`] into an assignment or a proof of infeasibility.
///
/// The solve is a blocking call. It returns once the oracle has proven optimality or
/// infeasibility, or once one of the [`SolveLimits`] is reached, in which case the best solution
/// found so far is reported as [`SolveOutcome::Feasible`].
pub trait Oracle {
    fn solve(
        &mut self,
        model: &Model,
        limits: &SolveLimits,
        callback: &mut dyn SolutionCallback,
    ) -> SolveOutcome;
}

/// Limits which make an oracle return its best result so far instead of proving optimality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveLimits {
    /// Wall-clock budget for the whole solve.
    pub time_limit: Option<Duration>,
    /// Stop once `best objective - best bound <= absolute_gap_limit`.
    pub absolute_gap_limit: Option<i64>,
}

/// Invoked synchronously on the solving thread for every improving solution. Implementations must
/// return quickly.
pub trait SolutionCallback {
    fn on_solution(&mut self, progress: SolutionProgress<'_>);
}

impl<F: FnMut(SolutionProgress<'_>)> SolutionCallback for F {
    fn on_solution(&mut self, progress: SolutionProgress<'_>) {
        (self)(progress)
    }
}

/// A [`SolutionCallback`] which ignores every solution.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCallback;

impl SolutionCallback for NoCallback {
    fn on_solution(&mut self, _: SolutionProgress<'_>) {}
}
