use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::{JoinError, JoinHandle};

use crate::TaskFate;

/// Handle to one launched task. Resolves to the task's [`TaskFate`].
///
/// Dropping a `Spawned` detaches the task; it keeps running.
#[derive(Debug)]
pub struct Spawned {
    handle: JoinHandle<TaskFate>,
}

impl Spawned {
    pub(crate) fn new(handle: JoinHandle<TaskFate>) -> Self {
        Self { handle }
    }

    /// `true` once the task has finished, whatever its fate.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for Spawned {
    type Output = Result<TaskFate, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().handle).poll(cx)
    }
}
