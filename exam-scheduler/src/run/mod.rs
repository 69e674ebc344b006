//! The lifecycle of one solve: a [`BuiltRun`] is handed to an [`Oracle`] and becomes a
//! [`FinishedRun`] in exactly one terminal [`RunState`].
//!
//! The run is `SOLVING` for the duration of [`BuiltRun::solve`]. The transitions and the progress
//! of the oracle are recorded in the [`RunLog`] as they arrive, so [`RunLog::state`] reports
//! `SOLVING` to anyone reading the log while the oracle runs. Only an `OPTIMAL` or `FEASIBLE` run
//! can be interpreted.
use std::fmt::Display;
use std::fmt::Formatter;

use scheduler_oracle::Oracle;
use scheduler_oracle::SolutionProgress;
use scheduler_oracle::SolveLimits;
use scheduler_oracle::SolveOutcome;
use scheduler_oracle::SolveStatus;

use crate::builder::build;
use crate::builder::HintPolicy;
use crate::builder::ScheduleModel;
use crate::compiler::compile;
use crate::compiler::CompiledRelations;
use crate::compiler::RuleSet;
use crate::error::BuildError;
use crate::error::SchedulerResult;
use crate::interpreter::interpret;
use crate::interpreter::Interpretation;
use crate::registry::Registry;
use crate::run_log::Notice;
use crate::run_log::RunLog;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunOptions {
    pub limits: SolveLimits,
    pub hints: HintPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    Built,
    Solving,
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Built | RunState::Solving)
    }

    /// Whether the run ended with an assignment which can be interpreted.
    pub fn has_solution(self) -> bool {
        matches!(self, RunState::Optimal | RunState::Feasible)
    }
}

impl From<SolveStatus> for RunState {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Optimal => RunState::Optimal,
            SolveStatus::Feasible => RunState::Feasible,
            SolveStatus::Infeasible => RunState::Infeasible,
            SolveStatus::Unknown => RunState::Unknown,
        }
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Built => write!(f, "BUILT"),
            RunState::Solving => write!(f, "SOLVING"),
            RunState::Optimal => write!(f, "OPTIMAL"),
            RunState::Feasible => write!(f, "FEASIBLE"),
            RunState::Infeasible => write!(f, "INFEASIBLE"),
            RunState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A model which is ready to be solved.
#[derive(Debug)]
pub struct BuiltRun<'registry> {
    registry: &'registry Registry,
    schedule_model: ScheduleModel,
    limits: SolveLimits,
}

impl<'registry> BuiltRun<'registry> {
    pub fn new(
        registry: &'registry Registry,
        relations: &CompiledRelations,
        options: &RunOptions,
    ) -> Result<BuiltRun<'registry>, BuildError> {
        Ok(BuiltRun {
            registry,
            schedule_model: build(registry, relations, &options.hints)?,
            limits: options.limits,
        })
    }

    pub fn state(&self) -> RunState {
        RunState::Built
    }

    pub fn schedule_model(&self) -> &ScheduleModel {
        &self.schedule_model
    }

    /// Blocks until the oracle reaches a terminal status or one of the limits.
    pub fn solve(self, oracle: &mut impl Oracle, log: &mut RunLog) -> FinishedRun<'registry> {
        let time_limit = self.limits.time_limit;
        log.record(Notice::SolveStarted { time_limit });

        let started_at = log.elapsed();
        let outcome = oracle.solve(
            self.schedule_model.model(),
            &self.limits,
            &mut |progress: SolutionProgress<'_>| {
                log.record(Notice::SolutionFound {
                    count: progress.solution_count,
                    objective_value: progress.objective_value,
                })
            },
        );
        log.record(Notice::SolverFinished {
            wall_time: log.elapsed().saturating_sub(started_at),
        });
        log.record(Notice::SolverStatus(outcome.status()));

        let finished = FinishedRun {
            registry: self.registry,
            schedule_model: self.schedule_model,
            outcome,
        };
        if let Some(interpretation) = finished.interpret() {
            if !interpretation.violations.is_empty() {
                log.record(Notice::UnmetIdealGaps {
                    count: interpretation.violations.len(),
                });
            }
        }
        finished
    }
}

/// A run in one of its terminal states.
#[derive(Debug)]
pub struct FinishedRun<'registry> {
    registry: &'registry Registry,
    schedule_model: ScheduleModel,
    outcome: SolveOutcome,
}

impl FinishedRun<'_> {
    pub fn state(&self) -> RunState {
        self.outcome.status().into()
    }

    pub fn outcome(&self) -> &SolveOutcome {
        &self.outcome
    }

    pub fn objective_value(&self) -> Option<i64> {
        self.outcome.objective_value()
    }

    pub fn schedule_model(&self) -> &ScheduleModel {
        &self.schedule_model
    }

    /// The schedule and unmet ideal gaps; [`None`] unless the run is `OPTIMAL` or `FEASIBLE`.
    pub fn interpret(&self) -> Option<Interpretation> {
        self.outcome
            .solution()
            .map(|solution| interpret(self.registry, &self.schedule_model, solution))
    }
}

/// Compiles `rules`, builds the model and solves it.
pub fn schedule<'registry>(
    registry: &'registry Registry,
    rules: &RuleSet,
    options: &RunOptions,
    oracle: &mut impl Oracle,
    log: &mut RunLog,
) -> SchedulerResult<FinishedRun<'registry>> {
    let relations = compile(registry, rules, log)?;
    let run = BuiltRun::new(registry, &relations, options)?;
    Ok(run.solve(oracle, log))
}
