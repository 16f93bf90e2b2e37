//! Simulated latency for units of work.
//!
//! [`SimulatedWork`](crate::SimulatedWork) asks a [`Delay`] how long task `i`
//! should take. Production runs use [`Jitter`]; tests use [`NoDelay`],
//! [`FixedDelay`] or a closure to stay deterministic.

use std::time::Duration;

use rand::Rng;

/// Produces the simulated duration of each task.
pub trait Delay: Send + Sync + 'static {
    fn delay(&self, index: usize) -> Duration;
}

/// Every task completes immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&self, _index: usize) -> Duration {
        Duration::ZERO
    }
}

/// Every task takes the same time.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelay(pub Duration);

impl Delay for FixedDelay {
    fn delay(&self, _index: usize) -> Duration {
        self.0
    }
}

/// Uniformly random duration between zero and `max`.
#[derive(Clone, Copy, Debug)]
pub struct Jitter {
    max: Duration,
}

impl Jitter {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Delay for Jitter {
    fn delay(&self, _index: usize) -> Duration {
        if self.max.is_zero() {
            return Duration::ZERO;
        }
        let fraction: f64 = rand::thread_rng().gen();
        self.max.mul_f64(fraction)
    }
}

/// Per-index delays, e.g. `|i| Duration::from_millis(10 * i as u64)`.
impl<F> Delay for F
where
    F: Fn(usize) -> Duration + Send + Sync + 'static,
{
    fn delay(&self, index: usize) -> Duration {
        self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_never_exceeds_max() {
        let jitter = Jitter::new(Duration::from_millis(10));
        for i in 0..1_000 {
            assert!(jitter.delay(i) <= Duration::from_millis(10));
        }
    }

    #[test]
    fn zero_jitter_is_zero() {
        assert_eq!(Jitter::new(Duration::ZERO).delay(3), Duration::ZERO);
    }

    #[test]
    fn closures_see_the_index() {
        let staggered = |i: usize| Duration::from_millis(i as u64);
        assert_eq!(staggered.delay(7), Duration::from_millis(7));
        assert_eq!(FixedDelay(Duration::from_secs(1)).delay(7), Duration::from_secs(1));
        assert_eq!(NoDelay.delay(7), Duration::ZERO);
    }
}
