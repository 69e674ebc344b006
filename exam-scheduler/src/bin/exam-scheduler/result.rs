use exam_scheduler::SchedulerError;
use thiserror::Error;

pub(crate) type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("The input directory {0} does not exist.")]
    MissingInputDirectory(String),
}
