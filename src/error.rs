//! Error types.
//!
//! - [`UnitFailure`] is the only error a unit of work can report. The first one
//!   observed by the collector ends the whole batch.
//! - [`FanOutError`] covers the driver itself (bad configuration, a task that
//!   panicked). It never describes a unit of work.

use thiserror::Error;

/// A unit of work failed.
///
/// Carries the index of the failing task. It is never retried: the collector
/// records the first one it sees, cancels the batch and stops.
///
/// ```
/// use failfast::UnitFailure;
///
/// let err = UnitFailure::at(2);
/// assert_eq!(err.index, 2);
/// assert_eq!(err.to_string(), "bang 2!");
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("bang {index}!")]
pub struct UnitFailure {
    /// Index of the task that failed.
    pub index: usize,
}

impl UnitFailure {
    pub fn at(index: usize) -> Self {
        Self { index }
    }
}

/// Errors produced by the fan-out driver.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FanOutError {
    /// A batch needs at least one task.
    #[error("task count must be positive")]
    NoTasks,

    /// A launched task panicked or was aborted before reporting its fate.
    #[error("task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl FanOutError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// ```
    /// use failfast::FanOutError;
    ///
    /// assert_eq!(FanOutError::NoTasks.as_label(), "fan_out_no_tasks");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FanOutError::NoTasks => "fan_out_no_tasks",
            FanOutError::Join(_) => "fan_out_join",
        }
    }
}
