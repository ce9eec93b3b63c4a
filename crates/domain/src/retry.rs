//! Retry and timeout policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry, backoff, and timeout policy applied per executed spec.
///
/// Backoff is exponential: `base_delay_ms * 2^(attempt - 1)`, capped at
/// `max_delay_ms`. Timeouts bound each attempt individually, not the
/// spec's total run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Base backoff delay in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on a single backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Status codes eligible for automatic retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_ms: 5000,
            base_delay_ms: 200,
            max_delay_ms: 5000,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sets the maximum attempt count (builder pattern).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the per-attempt timeout (builder pattern).
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the base backoff delay (builder pattern).
    #[must_use]
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Whether a status code should be retried under this policy.
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Whether another attempt is allowed after `attempt` (1-based) ran.
    #[must_use]
    pub const fn allows_another_attempt(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Backoff delay to wait after the given 1-based attempt failed.
    #[must_use]
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self
            .base_delay_ms
            .saturating_mul(1_u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }

    /// Per-attempt timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
