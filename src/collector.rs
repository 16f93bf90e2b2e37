use async_channel::Receiver;
use tracing::{debug, warn};

use crate::prelude::*;
use crate::runner::Delivery;
use crate::{CancelSignal, UnitFailure};

/// What the collector gathered before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<T> {
    /// Successful values in arrival order.
    pub values: Vec<T>,
    /// The failure that stopped collection, if any.
    pub error: Option<UnitFailure>,
}

/// Receives deliveries until `n` values have been collected or a failure
/// arrives, whichever comes first.
///
/// On the first failure the signal is cancelled and the collector returns
/// right away without draining the channel. If every sender goes away before
/// either happens, the collector returns what it has.
pub async fn collect<T>(
    n: usize,
    receiver: &Receiver<Delivery<T>>,
    signal: &CancelSignal,
) -> Collected<T> {
    let mut values = Vec::with_capacity(n);
    let mut error = None;

    while values.len() < n {
        let delivery = match receiver.recv().await {
            Ok(delivery) => delivery,
            Err(_) => {
                debug!(collected = values.len(), "delivery channel closed");
                break;
            }
        };

        match delivery.outcome.or_cancel(signal) {
            Ok(value) => values.push(value),
            Err(failure) => {
                warn!(task = delivery.index, %failure, "unit failed, cancelling batch");
                error = Some(failure);
                break;
            }
        }
    }

    Collected { values, error }
}
