//! Scripted in-memory backend for poller and tracker tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use taskwatch_client::{ClientError, Result, TaskApi};
use taskwatch_core::domain::task::{TaskId, TaskStatus};
use taskwatch_core::dto::task::{StatusResponse, SubmitForm, SubmitResponse};
use tokio::time::Instant;

/// One scripted status response
#[derive(Debug, Clone)]
pub enum Step {
    Status(String),
    ServerError(u16),
    Garbage,
}

impl Step {
    pub fn status(s: &str) -> Self {
        Step::Status(s.to_string())
    }

    pub fn server_error(code: u16) -> Self {
        Step::ServerError(code)
    }

    pub fn garbage() -> Self {
        Step::Garbage
    }
}

/// Backend whose status responses follow a per-task script
///
/// Steps are consumed in order; the last one repeats forever.
#[derive(Default)]
pub struct FakeApi {
    scripts: Mutex<HashMap<TaskId, VecDeque<Step>>>,
    results: Mutex<HashMap<TaskId, serde_json::Value>>,
    status_log: Mutex<HashMap<TaskId, Vec<Instant>>>,
    result_log: Mutex<HashMap<TaskId, usize>>,
    issued: Mutex<VecDeque<std::result::Result<TaskId, (u16, String)>>>,
    submissions: Mutex<Vec<SubmitForm>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, id: &TaskId, steps: impl IntoIterator<Item = Step>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(id.clone(), steps.into_iter().collect());
    }

    pub fn set_result(&self, id: &TaskId, payload: serde_json::Value) {
        self.results.lock().unwrap().insert(id.clone(), payload);
    }

    /// Queue the outcome of the next submission
    pub fn accept_next(&self, id: &str) {
        self.issued.lock().unwrap().push_back(Ok(TaskId::from(id)));
    }

    pub fn reject_next(&self, status: u16, message: &str) {
        self.issued
            .lock()
            .unwrap()
            .push_back(Err((status, message.to_string())));
    }

    pub fn status_calls(&self, id: &TaskId) -> usize {
        self.status_times(id).len()
    }

    pub fn status_times(&self, id: &TaskId) -> Vec<Instant> {
        self.status_log
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn result_calls(&self, id: &TaskId) -> usize {
        self.result_log
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    pub fn submissions(&self) -> Vec<SubmitForm> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn submit(&self, form: SubmitForm) -> Result<SubmitResponse> {
        self.submissions.lock().unwrap().push(form);
        match self.issued.lock().unwrap().pop_front() {
            Some(Ok(task_id)) => Ok(SubmitResponse {
                task_id,
                msg: Some("File uploaded and processing started!".to_string()),
            }),
            Some(Err((status, message))) => Err(ClientError::api_error(status, message)),
            None => Err(ClientError::ParseError("no submission scripted".to_string())),
        }
    }

    async fn get_status(&self, task_id: &TaskId) -> Result<StatusResponse> {
        self.status_log
            .lock()
            .unwrap()
            .entry(task_id.clone())
            .or_default()
            .push(Instant::now());

        let step = {
            let mut scripts = self.scripts.lock().unwrap();
            let steps = scripts.entry(task_id.clone()).or_default();
            if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            }
        };

        match step {
            Some(Step::Status(status)) => Ok(StatusResponse {
                task_id: Some(task_id.clone()),
                status: TaskStatus::new(status),
            }),
            Some(Step::ServerError(code)) => {
                Err(ClientError::api_error(code, "upstream unavailable"))
            }
            Some(Step::Garbage) => Err(ClientError::ParseError(
                "Failed to parse JSON response: expected value at line 1 column 1".to_string(),
            )),
            None => Ok(StatusResponse {
                task_id: Some(task_id.clone()),
                status: TaskStatus::new("unknown task id"),
            }),
        }
    }

    async fn get_results(&self, task_id: &TaskId) -> Result<serde_json::Value> {
        *self
            .result_log
            .lock()
            .unwrap()
            .entry(task_id.clone())
            .or_default() += 1;

        self.results
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .ok_or_else(|| ClientError::api_error(404, "Task not found"))
    }
}
