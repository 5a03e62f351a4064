//! Taskwatch HTTP Client
//!
//! A small, type-safe HTTP client for the prediction backend: submit an
//! upload, query a task's status, and fetch its result once completed.
//!
//! # Example
//!
//! ```no_run
//! use taskwatch_client::PredictionClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PredictionClient::new("http://localhost:5000");
//!
//!     let submitted = client.submit_file("data.csv", Vec::new()).await?;
//!     let status = client.get_status(&submitted.task_id).await?;
//!
//!     println!("{}: {}", submitted.task_id, status.status);
//!     Ok(())
//! }
//! ```

mod api;
pub mod error;
mod tasks;

// Re-export commonly used types
pub use api::TaskApi;
pub use error::{ClientError, Result};
pub use tasks::read_form;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use taskwatch_core::dto::task::ErrorBody;

/// HTTP client for the prediction backend
#[derive(Debug, Clone)]
pub struct PredictionClient {
    /// Base URL of the backend (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl PredictionClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend (e.g., "http://localhost:5000")
    ///
    /// # Example
    /// ```
    /// use taskwatch_client::PredictionClient;
    ///
    /// let client = PredictionClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use taskwatch_client::PredictionClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = PredictionClient::with_client("http://localhost:5000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL by appending path segments to the base URL
    ///
    /// Segments are percent-encoded, so opaque task ids are safe to pass.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx responses become [`ClientError::ApiError`], carrying the
    /// backend's `msg`/`error` field when the body has one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message().map(str::to_string))
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status.canonical_reason().unwrap_or("Unknown error").to_string()
                    } else {
                        body
                    }
                });
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
