//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod submit;
mod task;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use taskwatch_client::{PredictionClient, TaskApi};
use taskwatch_core::domain::task::TaskPhase;
use taskwatch_core::dto::task::FormField;
use tracing::{info, warn};

use crate::board::TaskBoard;
use crate::config::Config;
use crate::scheduler::{TaskPoller, TaskTracker};
use crate::types::parse_field;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload files for prediction and watch the resulting tasks
    Submit {
        /// Files to upload, one task per file
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Extra form field sent with every upload (name=value)
        #[arg(short = 'F', long = "field", value_parser = parse_field)]
        fields: Vec<FormField>,

        /// Print the task ids and exit without polling
        #[arg(long)]
        detach: bool,
    },
    /// Watch existing tasks until they finish
    Watch {
        /// Task ids to watch
        #[arg(required = true)]
        task_ids: Vec<String>,
    },
    /// Show the current status of a task
    Status {
        /// Task id
        task_id: String,
    },
    /// Show the result of a completed task
    Results {
        /// Task id
        task_id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = build_client(config)?;

    match command {
        Commands::Submit {
            files,
            fields,
            detach,
        } => submit::handle_submit(Arc::new(client), &files, fields, detach, config).await,
        Commands::Watch { task_ids } => task::watch_tasks(Arc::new(client), task_ids, config).await,
        Commands::Status { task_id } => task::show_status(&client, task_id.into()).await,
        Commands::Results { task_id } => task::show_results(&client, task_id.into()).await,
    }
}

/// Build the backend client with the configured request timeout
fn build_client(config: &Config) -> Result<PredictionClient> {
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(PredictionClient::with_client(
        config.server_url.clone(),
        http_client,
    ))
}

/// Create a tracker whose board echoes every change to stdout
fn new_tracker(api: Arc<dyn TaskApi>, config: &Config) -> TaskTracker {
    let board = Arc::new(TaskBoard::with_echo());
    let poller = Arc::new(TaskPoller::new(api, Arc::clone(&board), config));
    TaskTracker::new(poller, board)
}

/// Wait until every tracked task has ended, then print a summary
///
/// Ctrl-C and the configured deadline stop all chains early.
///
/// # Errors
/// Returns an error if any task ended in another phase than `Completed`.
async fn wait_for_tasks(tracker: &TaskTracker, config: &Config) -> Result<()> {
    info!("Watching {} task(s)", tracker.active());

    let join = tracker.join();
    tokio::pin!(join);

    let outcomes = tokio::select! {
        outcomes = &mut join => outcomes,
        _ = teardown_signal(config.deadline) => {
            for task_id in tracker.shutdown() {
                warn!("Stopped polling task {}", task_id);
            }
            join.await
        }
    };

    tracker.board().print_summary();

    let unfinished = outcomes
        .iter()
        .filter(|(_, phase)| *phase != TaskPhase::Completed)
        .count();
    if unfinished > 0 {
        anyhow::bail!(
            "{} of {} task(s) did not complete",
            unfinished,
            outcomes.len()
        );
    }

    Ok(())
}

/// Resolves on Ctrl-C or once the deadline, if any, has passed
async fn teardown_signal(deadline: Option<Duration>) {
    let expired = async {
        match deadline {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupted => warn!("Interrupted, stopping all tasks"),
        _ = expired => warn!("Timeout of {:?} reached, stopping all tasks", deadline.unwrap_or_default()),
    }
}
