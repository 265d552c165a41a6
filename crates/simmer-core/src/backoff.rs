//! Jittered exponential backoff between probe attempts

use rand::Rng;
use std::time::Duration;

/// Default minimum inter-attempt delay
pub const DEFAULT_MIN: Duration = Duration::from_millis(500);
/// Default maximum inter-attempt delay
pub const DEFAULT_MAX: Duration = Duration::from_secs(3);

/// Exponential backoff generator.
///
/// Each call to [`next`](Backoff::next) returns a delay that doubles from
/// `min` up to `max`. With jitter enabled the returned value is drawn
/// uniformly from `[min, computed]` so that multiple waiters watching the
/// same endpoint do not retry in lockstep.
#[derive(Debug)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    jitter: bool,
    attempt: u32,
}

impl Backoff {
    /// Create a backoff schedule over `[min, max]`
    pub fn new(min: Duration, max: Duration, jitter: bool) -> Self {
        Self {
            min,
            max,
            jitter,
            attempt: 0,
        }
    }

    /// Next delay in the schedule; advances the internal position
    pub fn next(&mut self) -> Duration {
        let computed = self
            .min
            .saturating_mul(1u32 << self.attempt.min(31))
            .min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        if self.jitter && computed > self.min {
            rand::thread_rng().gen_range(self.min..=computed)
        } else {
            computed
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_MIN, DEFAULT_MAX, true)
    }
}
