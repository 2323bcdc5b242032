//! Retry configuration for opening a completion stream.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    pub base_backoff_ms: u64,

    /// Maximum backoff delay in seconds.
    pub max_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 500,
            max_backoff_secs: 10,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        exponential_backoff(attempt, self.base_backoff_ms, self.max_backoff_secs)
    }
}

/// Calculate exponential backoff delay.
///
/// Formula: `min(base * 2^(attempt - 1), max_backoff)`
#[must_use]
pub fn exponential_backoff(attempt: u32, base_backoff_ms: u64, max_backoff_secs: u64) -> Duration {
    let max_ms = max_backoff_secs.saturating_mul(1000);

    // Cap the exponent to avoid overflow.
    let capped_attempt = attempt.saturating_sub(1).min(20);
    let base_delay = base_backoff_ms.saturating_mul(1u64 << capped_attempt);

    Duration::from_millis(base_delay.min(max_ms))
}
