use super::IntVar;
use super::IntervalId;
use super::Model;
use crate::error::ModelError;

/// A hard constraint of a [`Model`].
///
/// Use the functions in [`crate::constraints`] to create them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// `variable == value`
    Equals { variable: IntVar, value: i32 },
    /// `lhs + offset <= rhs`
    LessThanOrEquals { lhs: IntVar, rhs: IntVar, offset: i32 },
    /// No two of the present intervals overlap.
    NoOverlap { intervals: Vec<IntervalId> },
    /// At every point in time, the demands of the intervals covering that point sum to at most
    /// `capacity`. Only mandatory intervals are allowed.
    Cumulative {
        intervals: Vec<IntervalId>,
        demands: Vec<i32>,
        capacity: i32,
    },
}

impl Constraint {
    pub(crate) fn validate(&self, model: &Model) -> Result<(), ModelError> {
        match self {
            Constraint::Equals { variable, .. } => model.check_variable(*variable),
            Constraint::LessThanOrEquals { lhs, rhs, .. } => {
                model.check_variable(*lhs)?;
                model.check_variable(*rhs)
            }
            Constraint::NoOverlap { intervals } => intervals
                .iter()
                .try_for_each(|&interval| model.check_interval(interval)),
            Constraint::Cumulative {
                intervals,
                demands,
                capacity,
            } => {
                if intervals.len() != demands.len() {
                    return Err(ModelError::MismatchedLengths {
                        intervals: intervals.len(),
                        demands: demands.len(),
                    });
                }
                if *capacity < 0 {
                    return Err(ModelError::NegativeCapacity(*capacity));
                }
                if let Some(&demand) = demands.iter().find(|&&demand| demand < 0) {
                    return Err(ModelError::NegativeDemand(demand));
                }
                intervals.iter().try_for_each(|&interval| {
                    model.check_interval(interval)?;
                    if model.interval(interval).presence.is_some() {
                        return Err(ModelError::OptionalIntervalInCumulative(interval));
                    }
                    Ok(())
                })
            }
        }
    }
}

/// Creates the constraint `variable == value`.
pub fn equals(variable: IntVar, value: i32) -> Constraint {
    Constraint::Equals { variable, value }
}

/// Creates the constraint `lhs <= rhs`.
pub fn less_than_or_equals(lhs: IntVar, rhs: IntVar) -> Constraint {
    Constraint::LessThanOrEquals { lhs, rhs, offset: 0 }
}

/// Creates the constraint `lhs < rhs`.
pub fn less_than(lhs: IntVar, rhs: IntVar) -> Constraint {
    Constraint::LessThanOrEquals { lhs, rhs, offset: 1 }
}

/// Creates the constraint `lhs + offset <= rhs`.
pub fn plus_offset_less_than_or_equals(lhs: IntVar, offset: i32, rhs: IntVar) -> Constraint {
    Constraint::LessThanOrEquals { lhs, rhs, offset }
}

/// Creates the constraint that none of the present `intervals` overlap.
pub fn no_overlap(intervals: impl IntoIterator<Item = IntervalId>) -> Constraint {
    Constraint::NoOverlap {
        intervals: intervals.into_iter().collect(),
    }
}

/// Creates the cumulative constraint; `demands[i]` is the resource usage of `intervals[i]` over
/// its whole length.
pub fn cumulative(
    intervals: impl IntoIterator<Item = IntervalId>,
    demands: impl IntoIterator<Item = i32>,
    capacity: i32,
) -> Constraint {
    Constraint::Cumulative {
        intervals: intervals.into_iter().collect(),
        demands: demands.into_iter().collect(),
        capacity,
    }
}
