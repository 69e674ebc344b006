//! # Exam scheduler
//! Places exams on dates such that every hard rule holds and the weighted violation of the
//! preferred gaps between exams is as small as possible.
//!
//! Rules are written as wildcard patterns over exam names and expanded against the
//! [`Registry`] of exams and dates by the [`compiler`]. The resulting relations are turned into a
//! [`Model`](scheduler_oracle::Model) by the [`builder`], which is solved by any
//! [`Oracle`](scheduler_oracle::Oracle); the assignment is read back by the [`interpreter`].
//! Every noteworthy event of a run is kept in a [`RunLog`].
//!
//! ```rust
//! # use exam_scheduler::compiler::GapRule;
//! # use exam_scheduler::compiler::RowRef;
//! # use exam_scheduler::compiler::RuleSet;
//! # use exam_scheduler::compiler::Table;
//! # use exam_scheduler::run::schedule;
//! # use exam_scheduler::run::RunOptions;
//! # use exam_scheduler::run::RunState;
//! # use exam_scheduler::Registry;
//! # use exam_scheduler::RunLog;
//! # use scheduler_oracle::PumpkinOracle;
//! let mut registry = Registry::default();
//! registry.add_exam("Algebra 1", 1)?;
//! registry.add_exam("Algebra 2", 1)?;
//! for day in ["Mon", "Tue", "Wed"] {
//!     registry.add_date(day, 1)?;
//! }
//!
//! // Both algebra exams are at least two days apart.
//! let rules = RuleSet {
//!     gaps: vec![GapRule {
//!         row: RowRef::new(Table::Gaps, 2),
//!         first: "Algebra 1".to_owned(),
//!         second: "Algebra 2".to_owned(),
//!         min_days: Some(2),
//!         ideal_days: None,
//!         weight: 1,
//!     }],
//!     ..RuleSet::default()
//! };
//!
//! let mut log = RunLog::default();
//! let run = schedule(
//!     &registry,
//!     &rules,
//!     &RunOptions::default(),
//!     &mut PumpkinOracle::default(),
//!     &mut log,
//! )?;
//!
//! assert_eq!(RunState::Optimal, run.state());
//! let days = run
//!     .interpret()
//!     .map(|interpretation| interpretation.schedule)
//!     .unwrap_or_default()
//!     .into_iter()
//!     .map(|entry| entry.date)
//!     .collect::<Vec<_>>();
//! assert_eq!(vec!["Mon", "Wed"], days);
//! # Ok::<(), exam_scheduler::SchedulerError>(())
//! ```
pub mod builder;
pub mod compiler;
mod error;
pub mod interpreter;
pub mod io;
pub mod registry;
pub mod run;
mod run_log;

pub use error::*;
pub use registry::Registry;
pub use run_log::*;
