use thiserror::Error;

use crate::model::IntVar;
use crate::model::IntervalId;

/// Errors which occur while building a [`Model`](crate::Model).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("variable {0} does not belong to this model")]
    UnknownVariable(IntVar),
    #[error("interval {0:?} does not belong to this model")]
    UnknownInterval(IntervalId),
    #[error("cannot fix {variable} to {value}, its domain is [{lower_bound}, {upper_bound}]")]
    ValueOutsideDomain {
        variable: IntVar,
        value: i32,
        lower_bound: i32,
        upper_bound: i32,
    },
    #[error("interval '{name}' has negative size {size}")]
    NegativeSize { name: String, size: i32 },
    #[error("cumulative constraint over {intervals} intervals was given {demands} demands")]
    MismatchedLengths { intervals: usize, demands: usize },
    #[error("cumulative capacity must be non-negative, got {0}")]
    NegativeCapacity(i32),
    #[error("cumulative demands must be non-negative, got {0}")]
    NegativeDemand(i32),
    #[error("interval {0:?} is optional and cannot take part in a cumulative constraint")]
    OptionalIntervalInCumulative(IntervalId),
}
