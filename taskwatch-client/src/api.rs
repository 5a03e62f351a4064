//! Task API abstraction
//!
//! The poller and submission handler depend on this trait rather than on
//! [`PredictionClient`] directly, so they can be driven by an in-memory
//! backend in tests.

use async_trait::async_trait;
use taskwatch_core::domain::task::TaskId;
use taskwatch_core::dto::task::{StatusResponse, SubmitForm, SubmitResponse};

use crate::PredictionClient;
use crate::error::Result;

/// Operations offered by the prediction backend
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Submit a form and obtain a task identifier
    async fn submit(&self, form: SubmitForm) -> Result<SubmitResponse>;

    /// Query the status of a task
    async fn get_status(&self, task_id: &TaskId) -> Result<StatusResponse>;

    /// Fetch the result payload of a completed task
    async fn get_results(&self, task_id: &TaskId) -> Result<serde_json::Value>;
}

#[async_trait]
impl TaskApi for PredictionClient {
    async fn submit(&self, form: SubmitForm) -> Result<SubmitResponse> {
        PredictionClient::submit(self, form).await
    }

    async fn get_status(&self, task_id: &TaskId) -> Result<StatusResponse> {
        PredictionClient::get_status(self, task_id).await
    }

    async fn get_results(&self, task_id: &TaskId) -> Result<serde_json::Value> {
        PredictionClient::get_results(self, task_id).await
    }
}
