//! # Scheduler oracle
//! The model and oracle contract used by the exam scheduler, together with an oracle which
//! implements that contract on top of the Pumpkin constraint solver.
//!
//! A [`Model`] is built from bounded integer variables, fixed-size (optional) intervals, hard
//! [`constraints`] and an optional objective which is minimised. It is handed to an [`Oracle`]
//! together with [`SolveLimits`]; the oracle reports a [`SolveOutcome`] and calls back once for
//! every improving solution.
//!
//! ```
//! # use scheduler_oracle::constraints;
//! # use scheduler_oracle::LinearExpression;
//! # use scheduler_oracle::Model;
//! # use scheduler_oracle::Oracle;
//! # use scheduler_oracle::PumpkinOracle;
//! # use scheduler_oracle::SolveLimits;
//! # use scheduler_oracle::SolveStatus;
//! # use scheduler_oracle::SolutionProgress;
//! let mut model = Model::default();
//! let a = model.new_bounded_integer(0, 2, "a");
//! let b = model.new_bounded_integer(0, 2, "b");
//! let violated = model.new_boolean("violated");
//!
//! // `a` and `b` should preferably be three apart, which is impossible
//! let interval_a = model
//!     .new_optional_fixed_size_interval(a, 3, violated.negated(), "a")
//!     .expect("a exists");
//! let interval_b = model
//!     .new_optional_fixed_size_interval(b, 3, violated.negated(), "b")
//!     .expect("b exists");
//! model
//!     .add_constraint(constraints::no_overlap([interval_a, interval_b]))
//!     .expect("valid constraint");
//! model
//!     .minimise(LinearExpression::weighted_sum([(5, violated.as_integer())]))
//!     .expect("valid objective");
//!
//! let mut solutions = 0;
//! let mut oracle = PumpkinOracle::default();
//! let outcome = oracle.solve(
//!     &model,
//!     &SolveLimits::default(),
//!     &mut |_: SolutionProgress<'_>| solutions += 1,
//! );
//!
//! assert_eq!(SolveStatus::Optimal, outcome.status());
//! assert_eq!(Some(5), outcome.objective_value());
//! assert!(solutions >= 1);
//! ```
pub mod containers;
mod error;
mod model;
mod oracle;
mod pumpkin;
mod results;

/// Statistic logging of the underlying solver; configure it once before solving.
pub use pumpkin_core::statistics;

/// Functions which create the hard constraints of a [`Model`].
pub mod constraints {
    pub use crate::model::cumulative;
    pub use crate::model::equals;
    pub use crate::model::less_than;
    pub use crate::model::less_than_or_equals;
    pub use crate::model::no_overlap;
    pub use crate::model::plus_offset_less_than_or_equals;
    pub use crate::model::Constraint;
}

pub use error::ModelError;
pub use model::BoolVar;
pub use model::IntVar;
pub use model::Interval;
pub use model::IntervalId;
pub use model::LinearExpression;
pub use model::Literal;
pub use model::Model;
pub use model::VariableInfo;
pub use oracle::NoCallback;
pub use oracle::Oracle;
pub use oracle::SolutionCallback;
pub use oracle::SolveLimits;
pub use pumpkin::PumpkinOracle;
pub use pumpkin::SearchOptions;
pub use pumpkin::SolveStatistics;
pub use pumpkin_core::optimisation::OptimisationStrategy;
pub use results::Solution;
pub use results::SolutionProgress;
pub use results::SolveOutcome;
pub use results::SolveStatus;
