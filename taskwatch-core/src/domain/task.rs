//! Task domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status string the backend reports once a task's result is available
pub const COMPLETED: &str = "completed";

/// Prefix of every status string that marks a failed task
pub const FAILED_PREFIX: &str = "failed";

/// Opaque task identifier issued by the submission endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the task's container on the board (`task-{id}`)
    pub fn container_key(&self) -> String {
        format!("task-{}", self.0)
    }

    /// Key of the task's status region (`status-{id}`)
    pub fn status_key(&self) -> String {
        format!("status-{}", self.0)
    }

    /// Key of the task's result region (`result-{id}`)
    pub fn result_key(&self) -> String {
        format!("result-{}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Raw status string reported by the status endpoint
///
/// The set of values is open-ended. Only `"completed"` and strings starting
/// with `"failed"` carry meaning; anything else means the task is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(String);

impl TaskStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_completed(&self) -> bool {
        self.0 == COMPLETED
    }

    pub fn is_failed(&self) -> bool {
        self.0.starts_with(FAILED_PREFIX)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failed()
    }

    /// Phase a task enters after observing this status
    pub fn phase(&self) -> TaskPhase {
        if self.is_completed() {
            TaskPhase::Completed
        } else if self.is_failed() {
            TaskPhase::Failed
        } else {
            TaskPhase::InProgress
        }
    }

    /// What the poller must do next after observing this status
    pub fn decide(&self) -> PollDecision {
        match self.phase() {
            TaskPhase::Completed => PollDecision::FetchResult,
            TaskPhase::Failed => PollDecision::Fail(format!("Error: {}", self.0)),
            _ => PollDecision::PollAgain,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Client-side lifecycle of a tracked task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    /// Identifier received, no status observed yet
    Pending,
    /// A non-terminal status was observed
    InProgress,
    /// The backend reported `completed`
    Completed,
    /// The backend reported a `failed...` status
    Failed,
    /// Status or result could not be retrieved
    Unreachable,
    /// The poll chain was stopped before a terminal status
    Cancelled,
}

impl TaskPhase {
    /// Whether the poll chain for a task in this phase has ended
    pub fn is_final(&self) -> bool {
        !matches!(self, TaskPhase::Pending | TaskPhase::InProgress)
    }
}

/// Next step of the poll loop after a status response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
    /// Issue exactly one result fetch and stop polling
    FetchResult,
    /// Render the message into the result region and stop polling
    Fail(String),
    /// Schedule exactly one more status query after the poll delay
    PollAgain,
}
