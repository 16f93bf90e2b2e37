use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// One-shot broadcast cancellation signal shared by a batch.
///
/// The signal starts out active and moves to cancelled exactly once; there is
/// no way back. Clones observe the same state.
///
/// Wraps a [`CancellationToken`]; the extra flag records which `cancel` call
/// performed the transition.
///
/// # Examples
///
/// ```rust
/// let signal = failfast::CancelSignal::new();
/// let observer = signal.clone();
///
/// assert!(!observer.is_cancelled());
/// assert!(signal.cancel());
/// assert!(observer.is_cancelled());
///
/// // Further calls are no-ops.
/// assert!(!signal.cancel());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the signal to cancelled.
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// signal was already cancelled.
    pub fn cancel(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::AcqRel);
        self.token.cancel();
        first
    }

    /// Non-blocking check.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal is cancelled (immediately if it already is).
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
