//! The task runner.
//!
//! [`launch`] starts one tokio task per index. Each task computes its result,
//! looks at the cancellation signal once, and if the batch is still active
//! tries to hand the result to the collector:
//!
//! ```text
//! work.run(i, signal) ──► signal cancelled? ──yes──► Abandoned
//!                               │
//!                               no
//!                               ▼
//!                        sender.send(result)
//!                          ├─ accepted          ──► Delivered
//!                          ├─ channel closed    ──► Refused
//!                          └─ signal cancelled  ──► Interrupted  (RaceCancel only)
//! ```
//!
//! The check before delivery is best-effort: a task can pass it and then be
//! blocked in `send` when the collector stops. With
//! [`DeliveryMode::CheckThenSend`] such a task stays blocked until the
//! receiver is dropped; [`DeliveryMode::RaceCancel`] lets the signal
//! interrupt it.

use std::sync::Arc;

use async_channel::Sender;
use futures::future::{self, Either};
use tracing::debug;

use crate::spawned::Spawned;
use crate::{CancelSignal, FanOutError, UnitFailure, Work};

/// A task's result on its way to the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery<T> {
    pub index: usize,
    pub outcome: Result<T, UnitFailure>,
}

/// How a delivery attempt treats the cancellation signal once it has started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Check the signal once, then block on the channel. Only closing the
    /// channel releases a blocked sender.
    #[default]
    CheckThenSend,

    /// Check the signal, then block on the channel or the signal, whichever
    /// fires first.
    RaceCancel,
}

/// How a launched task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskFate {
    /// The channel accepted the result.
    Delivered,
    /// The signal was already cancelled when the result was ready.
    Abandoned,
    /// The collector hung up while the task was delivering.
    Refused,
    /// Cancellation arrived while the task was delivering.
    Interrupted,
}

impl TaskFate {
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskFate::Delivered => "delivered",
            TaskFate::Abandoned => "abandoned",
            TaskFate::Refused => "refused",
            TaskFate::Interrupted => "interrupted",
        }
    }
}

/// The tasks started by one call to [`launch`], in index order.
#[derive(Debug)]
pub struct Launched {
    tasks: Vec<Spawned>,
}

impl Launched {
    /// Number of tasks still running (working or blocked in delivery).
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Waits for every task and returns their fates in index order.
    ///
    /// A task that panicked is reported as [`FanOutError::Join`], but only
    /// after all the others have finished too.
    pub async fn join(self) -> Result<Vec<TaskFate>, FanOutError> {
        let fates = future::join_all(self.tasks).await;
        fates
            .into_iter()
            .map(|fate| fate.map_err(FanOutError::from))
            .collect()
    }
}

/// Launches `n` tasks running `work`, each delivering on `sender`.
///
/// Must be called from within a tokio runtime. The caller's `sender` is
/// consumed: once every task has finished, the channel has no senders left
/// and the receiving side observes it as closed.
pub fn launch<W: Work>(
    n: usize,
    work: Arc<W>,
    sender: Sender<Delivery<W::Output>>,
    signal: CancelSignal,
    mode: DeliveryMode,
) -> Launched {
    let tasks = (0..n)
        .map(|index| {
            let work = work.clone();
            let sender = sender.clone();
            let signal = signal.clone();
            let handle = tokio::spawn(async move {
                let outcome = work.run(index, signal.clone()).await;
                deliver(Delivery { index, outcome }, &sender, &signal, mode).await
            });
            Spawned::new(handle)
        })
        .collect();

    Launched { tasks }
}

async fn deliver<T>(
    delivery: Delivery<T>,
    sender: &Sender<Delivery<T>>,
    signal: &CancelSignal,
    mode: DeliveryMode,
) -> TaskFate {
    let index = delivery.index;
    if signal.is_cancelled() {
        debug!(task = index, "batch cancelled, dropping result");
        return TaskFate::Abandoned;
    }

    debug!(task = index, ok = delivery.outcome.is_ok(), "sending");
    let send = sender.send(delivery);

    let fate = match mode {
        DeliveryMode::CheckThenSend => match send.await {
            Ok(()) => TaskFate::Delivered,
            Err(_) => TaskFate::Refused,
        },
        DeliveryMode::RaceCancel => {
            let cancelled = signal.cancelled();
            futures::pin_mut!(send, cancelled);
            match future::select(send, cancelled).await {
                Either::Left((Ok(()), _)) => TaskFate::Delivered,
                Either::Left((Err(_), _)) => TaskFate::Refused,
                Either::Right(((), _)) => TaskFate::Interrupted,
            }
        }
    };

    if fate != TaskFate::Delivered {
        debug!(task = index, fate = fate.as_label(), "delivery did not go through");
    }
    fate
}
