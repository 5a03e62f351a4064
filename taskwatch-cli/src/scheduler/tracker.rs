//! Task tracker
//!
//! Owns the board and the registry of running poll chains. A task is tracked
//! at most once: its board entry doubles as the deduplication key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskwatch_core::domain::task::{TaskId, TaskPhase};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::poller::{PollHandle, TaskPoller};
use crate::board::TaskBoard;

/// Coordinates poll chains and their presentation
pub struct TaskTracker {
    board: Arc<TaskBoard>,
    poller: Arc<TaskPoller>,
    handles: Mutex<HashMap<TaskId, PollHandle>>,
    shutdown: CancellationToken,
}

impl TaskTracker {
    pub fn new(poller: Arc<TaskPoller>, board: Arc<TaskBoard>) -> Self {
        Self {
            board,
            poller,
            handles: Mutex::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn board(&self) -> &Arc<TaskBoard> {
        &self.board
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<TaskId, PollHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a board entry for a task and starts polling it
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    /// `false` if the task was already tracked; nothing is started then.
    pub fn track(&self, task_id: TaskId) -> bool {
        if !self.board.open(&task_id) {
            debug!("Task {} is already tracked", task_id);
            return false;
        }

        let handle = self
            .poller
            .spawn(task_id.clone(), self.shutdown.child_token());
        self.handles().insert(task_id, handle);
        true
    }

    /// Stops polling one task
    ///
    /// Returns `false` if the task has no running chain.
    pub fn cancel(&self, task_id: &TaskId) -> bool {
        match self.handles().get(task_id) {
            Some(handle) if !handle.is_finished() => {
                debug!("Cancelling poll chain of task {}", task_id);
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Stops polling every task
    ///
    /// Tasks tracked afterwards are cancelled as soon as they start.
    ///
    /// # Returns
    /// The tasks whose chains were still running
    pub fn shutdown(&self) -> Vec<TaskId> {
        let running: Vec<TaskId> = self
            .handles()
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(id, _)| id.clone())
            .collect();

        info!("Stopping {} poll chain(s)", running.len());
        let stopped = running
            .into_iter()
            .filter(|task_id| self.cancel(task_id))
            .collect();
        self.shutdown.cancel();
        stopped
    }

    /// Number of chains that have not ended yet
    pub fn active(&self) -> usize {
        self.handles().values().filter(|h| !h.is_finished()).count()
    }

    /// Waits for every chain started so far and returns their final phases
    ///
    /// Chains stay registered, so they can still be cancelled while this waits.
    pub async fn join(&self) -> Vec<(TaskId, TaskPhase)> {
        let handles: Vec<PollHandle> = self.handles().values().cloned().collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let task_id = handle.task_id().clone();
            outcomes.push((task_id, handle.join().await));
        }
        outcomes
    }
}
