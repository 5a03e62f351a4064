//! Configuration module
//!
//! Settings shared by every command: backend location, poll cadence, retry
//! policy and the optional overall deadline.

use std::time::Duration;

use crate::scheduler::RetryPolicy;

/// Default delay between two status queries of the same task
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the prediction backend
    pub server_url: String,

    /// Delay between two status queries of the same task
    pub poll_interval: Duration,

    /// Retry policy for status and result requests
    pub retry: RetryPolicy,

    /// Timeout of a single HTTP request
    pub request_timeout: Duration,

    /// Stop every poll chain once this much time has elapsed
    pub deadline: Option<Duration>,
}

impl Config {
    /// Creates a configuration with defaults for the given backend
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            deadline: None,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server_url cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.deadline.is_some_and(|d| d.is_zero()) {
            anyhow::bail!("timeout must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}
