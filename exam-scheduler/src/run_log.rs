//! The ordered record of everything noteworthy which happened during a run.
//!
//! Every entry is also forwarded to the `log` facade, so the same lines show up on the console
//! when a logger is configured.
use std::fmt::Display;
use std::fmt::Formatter;
use std::time::Duration;
use std::time::Instant;

use log::error;
use log::info;
use log::warn;
use log::Level;
use scheduler_oracle::SolveStatus;

use crate::compiler::RowRef;
use crate::run::RunState;

/// Measures the time since the start of a run.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    started_at: Instant,
}

impl Stopwatch {
    pub fn starting_now() -> Stopwatch {
        Stopwatch {
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// How a rule row interacted with the relations of earlier rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateKind {
    /// A stored value was replaced by a different one.
    Overriding,
    /// Every value the row touched was already stored.
    NonOverriding,
    /// A relation without a value was asserted again.
    Repeated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    ZeroMatches {
        row: RowRef,
    },
    Duplicate {
        row: RowRef,
        kind: DuplicateKind,
    },
    UnknownHintExam {
        row: RowRef,
        exam: String,
    },
    UnknownHintDate {
        row: RowRef,
        label: String,
    },
    RedundantIdealGap {
        first: String,
        second: String,
        min_days: u32,
        ideal_days: u32,
    },
    SolveStarted {
        time_limit: Option<Duration>,
    },
    SolutionFound {
        count: usize,
        objective_value: i64,
    },
    SolverFinished {
        wall_time: Duration,
    },
    SolverStatus(SolveStatus),
    UnmetIdealGaps {
        count: usize,
    },
    ExecutionFailed {
        reason: String,
    },
}

impl Notice {
    pub fn level(&self) -> Level {
        match self {
            Notice::ZeroMatches { .. }
            | Notice::UnknownHintExam { .. }
            | Notice::UnknownHintDate { .. } => Level::Warn,
            Notice::SolverStatus(status) if !status.has_solution() => Level::Warn,
            Notice::ExecutionFailed { .. } => Level::Error,
            _ => Level::Info,
        }
    }

    /// The state a run enters when this notice is recorded.
    pub fn state_transition(&self) -> Option<RunState> {
        match self {
            Notice::SolveStarted { .. } => Some(RunState::Solving),
            Notice::SolverStatus(status) => Some((*status).into()),
            _ => None,
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::ZeroMatches { row } => write!(f, "Constraint in {row} yielded 0 matches"),
            Notice::Duplicate { row, kind } => {
                write!(f, "Duplicate constraint(s) detected in {row}")?;
                match kind {
                    DuplicateKind::Overriding => write!(f, " (OVERRIDING)"),
                    DuplicateKind::NonOverriding => write!(f, " (non-overriding)"),
                    DuplicateKind::Repeated => Ok(()),
                }
            }
            Notice::UnknownHintExam { row, exam } => {
                write!(f, "Ignoring hint in {row}: unknown exam '{exam}'")
            }
            Notice::UnknownHintDate { row, label } => {
                write!(f, "Ignoring hint in {row}: unknown date '{label}'")
            }
            Notice::RedundantIdealGap {
                first,
                second,
                min_days,
                ideal_days,
            } => write!(
                f,
                "Ideal gap of {ideal_days} days between '{first}' and '{second}' is implied by the minimal gap of {min_days} days (disabled)"
            ),
            Notice::SolveStarted {
                time_limit: Some(limit),
            } => write!(
                f,
                "Solving scheduling problem (limiting to {}s)...",
                limit.as_secs_f64()
            ),
            Notice::SolveStarted { time_limit: None } => {
                write!(f, "Solving scheduling problem (NO time limit)...")
            }
            Notice::SolutionFound {
                count,
                objective_value,
            } => write!(
                f,
                "Feasible solution #{count} found, objective value = {objective_value}"
            ),
            Notice::SolverFinished { wall_time } => {
                write!(f, "Solver finished in {} s", wall_time.as_secs_f64())
            }
            Notice::SolverStatus(status) => {
                write!(f, "Solver status: {status}")?;
                match status {
                    SolveStatus::Infeasible => write!(
                        f,
                        " (the scheduling problem was proven infeasible, try relaxing some hard constraints)"
                    ),
                    SolveStatus::Unknown => write!(
                        f,
                        " (no solution found within the time limit, try increasing the limit)"
                    ),
                    SolveStatus::Optimal | SolveStatus::Feasible => Ok(()),
                }
            }
            Notice::UnmetIdealGaps { count } => write!(
                f,
                "{count} requested gap constraint(s) could not be satisfied (see the violations table)"
            ),
            Notice::ExecutionFailed { reason } => write!(f, "Execution failed, error: {reason}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub elapsed: Duration,
    pub notice: Notice,
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>9.3}s >>> {}", self.elapsed.as_secs_f64(), self.notice)
    }
}

#[derive(Clone, Debug)]
pub struct RunLog {
    stopwatch: Stopwatch,
    entries: Vec<LogEntry>,
}

impl Default for RunLog {
    fn default() -> Self {
        RunLog::new(Stopwatch::starting_now())
    }
}

impl RunLog {
    pub fn new(stopwatch: Stopwatch) -> RunLog {
        RunLog {
            stopwatch,
            entries: vec![],
        }
    }

    pub fn record(&mut self, notice: Notice) {
        match notice.level() {
            Level::Error => error!("{notice}"),
            Level::Warn => warn!("{notice}"),
            _ => info!("{notice}"),
        }
        self.entries.push(LogEntry {
            elapsed: self.stopwatch.elapsed(),
            notice,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter().map(|entry| &entry.notice)
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    /// The state of the run as recorded so far: `BUILT` until a solve starts, `SOLVING` while the
    /// oracle runs, and the terminal state afterwards.
    pub fn state(&self) -> RunState {
        self.notices()
            .filter_map(Notice::state_transition)
            .last()
            .unwrap_or(RunState::Built)
    }
}
