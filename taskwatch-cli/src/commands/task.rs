//! Task command handlers
//!
//! Handles watching existing tasks and one-shot status and result queries.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::*;
use taskwatch_client::{PredictionClient, TaskApi};
use taskwatch_core::domain::task::TaskId;

use super::{new_tracker, wait_for_tasks};
use crate::board::colorize_phase;
use crate::config::Config;
use crate::scheduler::poller::render_payload;

/// Poll existing tasks until they finish
pub async fn watch_tasks(api: Arc<dyn TaskApi>, task_ids: Vec<String>, config: &Config) -> Result<()> {
    let tracker = new_tracker(api, config);

    for task_id in task_ids {
        tracker.track(TaskId::from(task_id));
    }

    wait_for_tasks(&tracker, config).await
}

/// Query and print the status of a task once
pub async fn show_status(client: &PredictionClient, task_id: TaskId) -> Result<()> {
    let response = client
        .get_status(&task_id)
        .await
        .with_context(|| format!("Failed to get status of task {}", task_id))?;

    println!("{}", format!("Task ID: {}", task_id).bold());
    println!(
        "  Status: {}",
        colorize_phase(response.status.phase(), response.status.as_str())
    );

    Ok(())
}

/// Fetch and print the result of a task once
pub async fn show_results(client: &PredictionClient, task_id: TaskId) -> Result<()> {
    let payload = client
        .get_results(&task_id)
        .await
        .with_context(|| format!("Failed to get results of task {}", task_id))?;

    println!("{}", render_payload(&payload));

    Ok(())
}
