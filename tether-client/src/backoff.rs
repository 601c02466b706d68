//! Retry backoff policy
//!
//! Publish operations retry transient failures forever; the delay between
//! attempts grows exponentially from `initial_delay` by `factor` up to
//! `max_delay` and stays there.

use std::time::Duration;

/// Backoff parameters for retried operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied after each retry.
    pub factor: f64,
    /// Upper bound on the delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            factor: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Mutable backoff state for one retried operation.
#[derive(Debug)]
pub(crate) struct Backoff {
    policy: RetryPolicy,
    current: Duration,
}

impl Backoff {
    pub(crate) fn new(policy: RetryPolicy) -> Self {
        let current = policy.initial_delay.min(policy.max_delay);
        Self { policy, current }
    }

    /// Returns the delay to sleep before the next attempt and advances the
    /// sequence.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self
            .current
            .mul_f64(self.policy.factor)
            .min(self.policy.max_delay);
        delay
    }
}
