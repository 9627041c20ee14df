//! Retry policy: immutable exponential-backoff settings.

use std::time::Duration;

/// Exponential backoff settings for per-target fetch retries.
///
/// Shared read-only across every concurrent fetch; nothing here
/// mutates after construction. Per-call retry state (attempt counter,
/// last error) lives on the stack of each retry run, never on this
/// struct.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Transient failures tolerated before a run is declared exhausted.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Factor applied to the delay for each subsequent retry.
    pub multiplier: f64,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retry `attempt` (1-indexed): the base
    /// delay scaled by `multiplier^(attempt - 1)`, capped at
    /// `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }
}
