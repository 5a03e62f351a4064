//! Task-related API endpoints

use crate::PredictionClient;
use crate::error::{ClientError, Result};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use taskwatch_core::domain::task::TaskId;
use taskwatch_core::dto::task::{FormField, StatusResponse, SubmitForm, SubmitResponse};
use tracing::debug;

/// Build a submission form from a file on disk
///
/// The file's name is sent along with its content, as a browser does for a
/// file input.
pub async fn read_form(path: impl AsRef<Path>, fields: Vec<FormField>) -> Result<SubmitForm> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ClientError::InvalidRequest(format!("{} has no file name", path.display())))?
        .to_string();
    let content = tokio::fs::read(path).await?;

    Ok(SubmitForm {
        file_name,
        content,
        fields,
    })
}

impl PredictionClient {
    // =============================================================================
    // Submission
    // =============================================================================

    /// Submit a form to the prediction endpoint
    ///
    /// The file content is sent as the multipart part `file`, followed by one
    /// text part per extra field.
    ///
    /// # Returns
    /// The task identifier issued by the backend
    pub async fn submit(&self, form: SubmitForm) -> Result<SubmitResponse> {
        let url = self.endpoint(&["predict"])?;
        debug!(
            "Submitting {} ({} bytes, {} field(s))",
            form.file_name,
            form.content.len(),
            form.fields.len()
        );

        let mut multipart = Form::new().part(
            "file",
            Part::bytes(form.content).file_name(form.file_name),
        );
        for field in form.fields {
            multipart = multipart.text(field.name, field.value);
        }

        let response = self.client.post(url).multipart(multipart).send().await?;

        self.handle_response(response).await
    }

    /// Read a file from disk and submit it
    ///
    /// # Arguments
    /// * `path` - The file to upload; its file name is sent along
    /// * `fields` - Additional form fields
    ///
    /// # Example
    /// ```no_run
    /// # use taskwatch_client::PredictionClient;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = PredictionClient::new("http://localhost:5000");
    /// let submitted = client.submit_file("houses.csv", Vec::new()).await?;
    /// println!("task {}", submitted.task_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_file(
        &self,
        path: impl AsRef<Path>,
        fields: Vec<FormField>,
    ) -> Result<SubmitResponse> {
        let form = read_form(path, fields).await?;
        self.submit(form).await
    }

    // =============================================================================
    // Task Query
    // =============================================================================

    /// Get the current status of a task
    pub async fn get_status(&self, task_id: &TaskId) -> Result<StatusResponse> {
        let url = self.endpoint(&["status", task_id.as_str()])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Get the result payload of a completed task
    ///
    /// The payload is returned as-is; no schema is imposed on it.
    pub async fn get_results(&self, task_id: &TaskId) -> Result<serde_json::Value> {
        let url = self.endpoint(&["results", task_id.as_str()])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}
