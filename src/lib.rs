//! # failfast
//!
//! Fail-fast fan-out: launch `N` independent units of work at once, collect
//! their results as they arrive, and stop at the first failure, telling every
//! unit that has not delivered yet to give up.
//!
//! ```text
//!   task 0   task 1   ...   task N-1        (runner: one tokio task each)
//!     │        │              │
//!     │ work.run(i, signal)   │
//!     │ signal cancelled? ──► drop result
//!     ▼        ▼              ▼
//! ┌──────────────────────────────────┐
//! │  delivery channel (N senders)    │
//! └────────────────┬─────────────────┘
//!                  ▼
//!              collector ── first failure ──► signal.cancel()
//!                  │
//!                  ▼
//!               Report { values, error, launched }
//! ```
//!
//! Results are collected in arrival order. Only the first failure is
//! reported; whatever arrived before it is kept, nothing after it is read.
//! Cancellation is cooperative: it never interrupts a unit of work. Each unit
//! receives the batch's [`CancelSignal`] and may watch it to stop early; a
//! result that is ready after cancellation is never delivered. See
//! [`DeliveryMode`] for what happens to a unit that was already delivering
//! when the batch was cancelled.
//!
//! # Example
//!
//! ```rust
//! use failfast::{CancelSignal, Config, UnitFailure, WorkFn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), failfast::FanOutError> {
//!     let cfg = Config { tasks: 4, ..Config::default() };
//!
//!     let work = WorkFn::new(|i: usize, _signal: CancelSignal| async move {
//!         if i == 2 {
//!             return Err(UnitFailure::at(i));
//!         }
//!         Ok(i * 10)
//!     });
//!     let report = failfast::fan_out(&cfg, work).await?;
//!
//!     assert_eq!(report.error, Some(UnitFailure::at(2)));
//!     assert!(report.count() < 4);
//!
//!     // Units still running when the batch failed can be waited for.
//!     let fates = report.launched.join().await?;
//!     assert_eq!(fates.len(), 4);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::info;

mod collector;
mod config;
mod delay;
mod error;
mod result_ext;
mod runner;
mod signal;
mod spawned;
mod work;

pub use self::collector::{collect, Collected};
pub use self::config::Config;
pub use self::delay::{Delay, FixedDelay, Jitter, NoDelay};
pub use self::error::{FanOutError, UnitFailure};
pub use self::runner::{launch, Delivery, DeliveryMode, Launched, TaskFate};
pub use self::signal::CancelSignal;
pub use self::spawned::Spawned;
pub use self::work::{SimulatedWork, Work, WorkFn};

pub mod prelude {
    pub use crate::result_ext::ResultExt;
    pub use crate::work::Work;
}

/// Outcome of one batch.
#[derive(Debug)]
pub struct Report<T> {
    /// Collected values in arrival order.
    pub values: Vec<T>,
    /// The failure that stopped the batch, if any.
    pub error: Option<UnitFailure>,
    /// The batch's tasks. After a failure some may still be running; join
    /// them to learn every task's [`TaskFate`], or drop this to detach them.
    pub launched: Launched,
}

impl<T> Report<T> {
    /// Number of values collected.
    ///
    /// On failure this is however many arrived before the failing result,
    /// which varies from run to run.
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

/// Runs `work` for every index in `0..cfg.tasks` and collects the results,
/// stopping at the first failure.
///
/// Returns as soon as collection stops, without waiting for units that are
/// still running. By then the signal is cancelled (on failure) and the
/// channel is closed, so every remaining task ends on its own: abandoned if
/// its result comes later, refused if it was blocked delivering. Their fates
/// are available through [`Report::launched`].
pub async fn fan_out<W: Work>(cfg: &Config, work: W) -> Result<Report<W::Output>, FanOutError> {
    cfg.validate()?;

    let signal = CancelSignal::new();
    let (sender, receiver) = async_channel::bounded(1);

    let launched = launch(cfg.tasks, Arc::new(work), sender, signal.clone(), cfg.delivery);
    let Collected { values, error } = collect(cfg.tasks, &receiver, &signal).await;

    // Hang up: any task blocked in `send` now gets `Refused`.
    drop(receiver);

    info!(
        collected = values.len(),
        failed = error.map(|e| e.index),
        still_running = launched.pending(),
        "batch finished"
    );

    Ok(Report {
        values,
        error,
        launched,
    })
}

/// [`fan_out`] with [`SimulatedWork`]: each task sleeps up to
/// `cfg.max_sleep`, returns its own index, and task `cfg.fail_index` fails.
pub async fn run(cfg: &Config) -> Result<Report<i64>, FanOutError> {
    let work = SimulatedWork::new(cfg.fail_index, Jitter::new(cfg.max_sleep));
    fan_out(cfg, work).await
}
