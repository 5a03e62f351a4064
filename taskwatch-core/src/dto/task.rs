//! Task DTOs for the prediction backend

use serde::{Deserialize, Serialize};

use crate::domain::task::{TaskId, TaskStatus};

/// Response of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Response of `GET /status/{task_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub status: TaskStatus,
}

/// Error body returned by the backend on non-2xx responses
///
/// Submission errors carry `msg`, lookups carry `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref().or(self.error.as_deref())
    }
}

/// One multipart field of a submission besides the uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Form submitted to `POST /predict`
#[derive(Debug, Clone)]
pub struct SubmitForm {
    /// File name sent with the `file` part
    pub file_name: String,
    /// Raw file content
    pub content: Vec<u8>,
    /// Additional text fields
    pub fields: Vec<FormField>,
}
