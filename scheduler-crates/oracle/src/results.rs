//! What an [`Oracle`](crate::Oracle) reports back.
use std::fmt::Display;
use std::fmt::Formatter;

use crate::containers::KeyedVec;
use crate::model::BoolVar;
use crate::model::IntVar;
use crate::model::Literal;

/// A value for every variable of a model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    values: KeyedVec<IntVar, i32>,
}

impl Solution {
    pub fn new(values: KeyedVec<IntVar, i32>) -> Self {
        Self { values }
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    pub fn get_integer_value(&self, variable: IntVar) -> i32 {
        self.values[variable]
    }

    pub fn get_boolean_value(&self, variable: BoolVar) -> bool {
        self.values[variable.as_integer()] != 0
    }

    pub fn get_literal_value(&self, literal: Literal) -> bool {
        literal.evaluate(self.values[literal.variable().as_integer()])
    }
}

impl FromIterator<i32> for Solution {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// The terminal status of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// A solution was found and proven optimal (or the model has no objective).
    Optimal,
    /// A solution was found, but the search stopped before proving it optimal.
    Feasible,
    /// The model was proven to have no solution.
    Infeasible,
    /// The search stopped before finding a solution or proving there is none.
    Unknown,
}

impl SolveStatus {
    /// Whether the status comes with a usable assignment.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "OPTIMAL"),
            SolveStatus::Feasible => write!(f, "FEASIBLE"),
            SolveStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolveStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The result of a solve; only [`SolveOutcome::Optimal`] and [`SolveOutcome::Feasible`] carry an
/// assignment.
#[derive(Clone, Debug)]
pub enum SolveOutcome {
    Optimal {
        solution: Solution,
        objective_value: i64,
    },
    Feasible {
        solution: Solution,
        objective_value: i64,
        best_bound: i64,
    },
    Infeasible,
    Unknown,
}

impl SolveOutcome {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveOutcome::Optimal { .. } => SolveStatus::Optimal,
            SolveOutcome::Feasible { .. } => SolveStatus::Feasible,
            SolveOutcome::Infeasible => SolveStatus::Infeasible,
            SolveOutcome::Unknown => SolveStatus::Unknown,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Optimal { solution, .. } | SolveOutcome::Feasible { solution, .. } => {
                Some(solution)
            }
            SolveOutcome::Infeasible | SolveOutcome::Unknown => None,
        }
    }

    pub fn objective_value(&self) -> Option<i64> {
        match self {
            SolveOutcome::Optimal {
                objective_value, ..
            }
            | SolveOutcome::Feasible {
                objective_value, ..
            } => Some(*objective_value),
            SolveOutcome::Infeasible | SolveOutcome::Unknown => None,
        }
    }
}

/// Passed to a [`SolutionCallback`](crate::SolutionCallback) for every improving solution.
#[derive(Clone, Copy, Debug)]
pub struct SolutionProgress<'a> {
    pub solution: &'a Solution,
    pub objective_value: i64,
    /// The best lower bound on the objective proven so far, if any.
    pub best_bound: Option<i64>,
    /// 1 for the first solution, 2 for the second improving one, and so on.
    pub solution_count: usize,
}
