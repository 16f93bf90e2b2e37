use std::time::Duration;

use crate::{DeliveryMode, FanOutError};

/// Settings for one batch.
///
/// `fail_index` and `max_sleep` only drive the built-in
/// [`SimulatedWork`](crate::SimulatedWork) used by [`run`](crate::run);
/// [`fan_out`](crate::fan_out) with caller-supplied work ignores them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of tasks to launch. Must be positive.
    pub tasks: usize,
    /// Index of the task that fails. Out of `[0, tasks)` means none does.
    pub fail_index: i64,
    /// Narrate progress.
    pub verbose: bool,
    /// Upper bound on the simulated duration of each task.
    pub max_sleep: Duration,
    pub delivery: DeliveryMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks: 10,
            fail_index: 0,
            verbose: true,
            max_sleep: Duration::from_millis(10),
            delivery: DeliveryMode::CheckThenSend,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), FanOutError> {
        if self.tasks == 0 {
            return Err(FanOutError::NoTasks);
        }
        Ok(())
    }

    /// `true` if some task in the batch is configured to fail.
    pub fn expects_failure(&self) -> bool {
        usize::try_from(self.fail_index).is_ok_and(|i| i < self.tasks)
    }
}
