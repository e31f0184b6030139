//! Bounded retry with exponential backoff for external calls

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Retry policy shared by every external call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    max_attempts: u32,
    /// Delay before the second attempt
    base_delay: Duration,
    /// Upper bound on a single delay
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(8))
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Policy that tries exactly once
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the given failed attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out
    pub async fn run<F, Fut, T>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt + 1 < self.max_attempts {
                        let delay = self.delay_for(attempt);
                        tracing::warn!(
                            "{} failed (attempt {}/{}): {}; retrying in {:?}",
                            what,
                            attempt + 1,
                            self.max_attempts,
                            e,
                            delay
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal(format!("{} was never attempted", what))))
    }
}
