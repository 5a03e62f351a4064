//! Bounded retry with exponential backoff
//!
//! Applied to status and result requests. Submissions are never retried.

use std::future::Future;
use std::time::Duration;

use taskwatch_client::Result;
use tracing::warn;

/// How transient request failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 fails on the first error
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound of any single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based), doubling up to `max_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// retries are exhausted
    ///
    /// # Arguments
    /// * `what` - Short description of the request, used in log lines
    /// * `op` - Produces a fresh request future per attempt
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries && e.is_retryable() => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    warn!(
                        "{} failed (retry {}/{}): {}; retrying in {:?}",
                        what, retry, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}
