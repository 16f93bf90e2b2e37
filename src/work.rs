//! Units of work.
//!
//! A [`Work`] computes the result of task `i`. The runner calls it once per
//! index, concurrently, and does not care what happens inside: only the
//! returned value or [`UnitFailure`] matters.
//!
//! Each call also gets the batch's [`CancelSignal`]. Work that watches it can
//! give up early once the batch has failed; its result would be dropped
//! anyway.
//!
//! - [`WorkFn`] adapts a closure returning a future.
//! - [`SimulatedWork`] sleeps for a [`Delay`] and fails at a chosen index.

use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use crate::delay::{Delay, Jitter};
use crate::{CancelSignal, UnitFailure};

/// One unit of work per task index.
#[async_trait]
pub trait Work: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn run(&self, index: usize, signal: CancelSignal) -> Result<Self::Output, UnitFailure>;
}

/// Closure-backed work. Each call produces a fresh future.
///
/// ```rust
/// use failfast::{CancelSignal, Work, WorkFn, UnitFailure};
///
/// # futures::executor::block_on(async {
/// let square = WorkFn::new(|i: usize, _signal: CancelSignal| async move {
///     if i == 3 {
///         return Err(UnitFailure::at(i));
///     }
///     Ok(i * i)
/// });
/// assert_eq!(square.run(2, CancelSignal::new()).await, Ok(4));
/// assert_eq!(square.run(3, CancelSignal::new()).await, Err(UnitFailure::at(3)));
/// # });
/// ```
#[derive(Debug)]
pub struct WorkFn<F> {
    f: F,
}

impl<F> WorkFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut, T> Work for WorkFn<F>
where
    F: Fn(usize, CancelSignal) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, UnitFailure>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn run(&self, index: usize, signal: CancelSignal) -> Result<T, UnitFailure> {
        (self.f)(index, signal).await
    }
}

/// Sleeps for a while, then returns its own index, or fails if the index is
/// the configured failing one. The sleep ends early if the batch is
/// cancelled.
///
/// A `fail_index` outside `[0, tasks)` (negative, or too large) means no task
/// fails.
#[derive(Clone, Debug)]
pub struct SimulatedWork<D = Jitter> {
    fail_index: i64,
    delay: D,
}

impl<D: Delay> SimulatedWork<D> {
    pub fn new(fail_index: i64, delay: D) -> Self {
        Self { fail_index, delay }
    }
}

#[async_trait]
impl<D: Delay> Work for SimulatedWork<D> {
    type Output = i64;

    async fn run(&self, index: usize, signal: CancelSignal) -> Result<i64, UnitFailure> {
        let delay = self.delay.delay(index);
        debug!(task = index, ?delay, "sleeping");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = signal.cancelled() => debug!(task = index, "batch cancelled, cutting sleep short"),
        }

        let value = i64::try_from(index).map_err(|_| UnitFailure::at(index))?;
        if value == self.fail_index {
            return Err(UnitFailure::at(index));
        }
        Ok(value)
    }
}
