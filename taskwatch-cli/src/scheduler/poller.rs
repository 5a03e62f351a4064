//! Task poller
//!
//! Queries a task's status until a terminal status is observed, then fetches
//! and renders its result. Each task runs its own chain in its own tokio task;
//! chains share nothing but the board.

use std::sync::Arc;
use std::time::Duration;

use taskwatch_client::{ClientError, TaskApi};
use taskwatch_core::domain::task::{PollDecision, TaskId, TaskPhase, TaskStatus};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::retry::RetryPolicy;
use crate::board::TaskBoard;
use crate::config::Config;

/// Render a result payload as pretty-printed JSON (2-space indent)
pub fn render_payload(payload: &serde_json::Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

/// Handle to a running poll chain
///
/// Clones observe the same chain.
#[derive(Debug, Clone)]
pub struct PollHandle {
    task_id: TaskId,
    cancel: CancellationToken,
    outcome: watch::Receiver<Option<TaskPhase>>,
}

impl PollHandle {
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Stops the chain at its next suspension point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Waits for the chain to end and returns the task's final phase
    pub async fn join(mut self) -> TaskPhase {
        match self.outcome.wait_for(Option::is_some).await {
            Ok(phase) => (*phase).unwrap_or(TaskPhase::Unreachable),
            Err(_) => {
                warn!("Poll chain for task {} ended without an outcome", self.task_id);
                TaskPhase::Unreachable
            }
        }
    }
}

/// Polls tasks and renders their outcome on the board
pub struct TaskPoller {
    api: Arc<dyn TaskApi>,
    board: Arc<TaskBoard>,
    poll_interval: Duration,
    retry: RetryPolicy,
}

impl TaskPoller {
    /// Creates a new task poller
    pub fn new(api: Arc<dyn TaskApi>, board: Arc<TaskBoard>, config: &Config) -> Self {
        Self {
            api,
            board,
            poll_interval: config.poll_interval,
            retry: config.retry,
        }
    }

    /// Spawns the poll chain of one task
    ///
    /// The chain stops when a terminal status is observed or `cancel` fires.
    pub fn spawn(self: &Arc<Self>, task_id: TaskId, cancel: CancellationToken) -> PollHandle {
        let poller = Arc::clone(self);
        let chain_id = task_id.clone();
        let chain_cancel = cancel.clone();

        let (done, outcome) = watch::channel(None);
        tokio::spawn(async move {
            let phase = poller.run(&chain_id, &chain_cancel).await;
            done.send_replace(Some(phase));
        });

        PollHandle {
            task_id,
            cancel,
            outcome,
        }
    }

    /// Runs the poll loop of one task to completion
    ///
    /// Every status response is shown on the board before it is acted on.
    /// Exactly one status query is in flight per task at any time.
    ///
    /// # Returns
    /// The phase the task ended in
    pub async fn run(&self, task_id: &TaskId, cancel: &CancellationToken) -> TaskPhase {
        info!("Polling task {} every {:?}", task_id, self.poll_interval);
        let mut polls: u64 = 0;

        loop {
            polls += 1;
            debug!("Status query #{} for task {}", polls, task_id);

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(task_id),
                r = self.retry.run("status query", || self.api.get_status(task_id)) => r,
            };

            let status = match response {
                Ok(response) => response.status,
                Err(e) => return self.unreachable(task_id, "status query", e),
            };

            self.board.show_status(task_id, &status);

            match status.decide() {
                PollDecision::FetchResult => {
                    info!("Task {} completed after {} status query(ies)", task_id, polls);
                    return self.fetch_result(task_id, cancel).await;
                }
                PollDecision::Fail(message) => {
                    warn!("Task {} failed: {}", task_id, status);
                    self.board.show_result(task_id, &message, TaskPhase::Failed);
                    return TaskPhase::Failed;
                }
                PollDecision::PollAgain => {
                    self.log_progress(task_id, &status);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return self.cancelled(task_id),
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }
    }

    /// Fetches the result of a completed task and renders it
    async fn fetch_result(&self, task_id: &TaskId, cancel: &CancellationToken) -> TaskPhase {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.cancelled(task_id),
            r = self.retry.run("result fetch", || self.api.get_results(task_id)) => r,
        };

        match response {
            Ok(payload) => {
                self.board
                    .show_result(task_id, &render_payload(&payload), TaskPhase::Completed);
                TaskPhase::Completed
            }
            Err(e) => self.unreachable(task_id, "result fetch", e),
        }
    }

    fn log_progress(&self, task_id: &TaskId, status: &TaskStatus) {
        debug!(
            "Task {} is {}; next query in {:?}",
            task_id, status, self.poll_interval
        );
    }

    fn cancelled(&self, task_id: &TaskId) -> TaskPhase {
        info!("Polling of task {} cancelled", task_id);
        self.board.mark(task_id, TaskPhase::Cancelled);
        TaskPhase::Cancelled
    }

    fn unreachable(&self, task_id: &TaskId, what: &str, e: ClientError) -> TaskPhase {
        error!("Giving up on task {}: {} failed: {}", task_id, what, e);
        self.board
            .show_result(task_id, &format!("Error: {}", e), TaskPhase::Unreachable);
        TaskPhase::Unreachable
    }
}
