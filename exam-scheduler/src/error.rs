use std::path::PathBuf;

use scheduler_oracle::ModelError;
use thiserror::Error;

use crate::compiler::RowRef;
use crate::compiler::Table;
use crate::registry::DateId;
use crate::registry::ExamId;

/// A pattern or substitution template which cannot be turned into a regular expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("the pattern '{derived}' derived from exam '{name}' is invalid: {reason}")]
    InvalidDerivedPattern {
        name: String,
        derived: String,
        reason: String,
    },
    #[error("invalid substitution template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("the table {table} was not found at {}", path.display())]
    Missing { table: Table, path: PathBuf },
    #[error("{table}, line {line}: expected at least {expected} columns but found {found}")]
    MissingColumns {
        table: Table,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{table}, line {line}, column {column}: '{value}' is not a non-negative integer")]
    MalformedInteger {
        table: Table,
        line: usize,
        column: usize,
        value: String,
    },
    #[error("failed to read {table}: {source}")]
    Io {
        table: Table,
        source: std::io::Error,
    },
}

/// Errors which make a set of rule rows impossible to compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("{row}: {source}")]
    InvalidPattern { row: RowRef, source: PatternError },
    #[error("{row}: unknown date '{label}'")]
    UnknownDate { row: RowRef, label: String },
    #[error("the exam '{0}' is listed more than once")]
    DuplicateExam(String),
    #[error("the date '{0}' is listed more than once")]
    DuplicateDate(String),
}

/// Errors which prevent a scheduling model from being built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("there are no dates to schedule exams on")]
    NoDates,
    #[error("there are no exams to schedule")]
    NoExams,
    #[error("relation refers to exam {0} which is not registered")]
    ExamOutOfRange(ExamId),
    #[error("relation refers to date {0} which is not registered")]
    DateOutOfRange(DateId),
    #[error("failed to construct the model: {0}")]
    Model(#[from] ModelError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("failed to read the input tables, more details: {0}")]
    Table(#[from] TableError),
    #[error("failed to compile the rules, more details: {0}")]
    Compile(#[from] CompileError),
    #[error("failed to build the scheduling model, more details: {0}")]
    Build(#[from] BuildError),
    #[error("IO error, more details: {0}")]
    Io(#[from] std::io::Error),
}
