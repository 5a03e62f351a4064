//! Submit command handler
//!
//! Uploads each file once and hands every issued task id to the tracker.
//! A failed submission is reported on the log channel and never retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use taskwatch_client::{TaskApi, read_form};
use taskwatch_core::domain::task::TaskId;
use taskwatch_core::dto::task::{FormField, SubmitResponse};
use tracing::{error, info};

use super::{new_tracker, wait_for_tasks};
use crate::config::Config;

/// Handle the submit command
pub async fn handle_submit(
    api: Arc<dyn TaskApi>,
    files: &[PathBuf],
    fields: Vec<FormField>,
    detach: bool,
    config: &Config,
) -> Result<()> {
    let tracker = new_tracker(Arc::clone(&api), config);
    let mut accepted = 0;

    for file in files {
        let Some(task_id) = submit_upload(api.as_ref(), file, fields.clone()).await else {
            continue;
        };
        accepted += 1;

        if detach {
            println!("{}", task_id);
        } else {
            tracker.track(task_id);
        }
    }

    if accepted == 0 {
        anyhow::bail!("No upload was accepted");
    }

    if detach {
        return Ok(());
    }

    wait_for_tasks(&tracker, config).await
}

/// Submit one file
///
/// # Returns
/// The issued task id, or `None` if the submission failed; the failure has
/// been logged.
pub async fn submit_upload(
    api: &dyn TaskApi,
    path: &Path,
    fields: Vec<FormField>,
) -> Option<TaskId> {
    match send_upload(api, path, fields).await {
        Ok(response) => {
            info!(
                "Submitted {} as task {}{}",
                path.display(),
                response.task_id,
                response
                    .msg
                    .map(|m| format!(": {}", m))
                    .unwrap_or_default()
            );
            Some(response.task_id)
        }
        Err(e) => {
            error!("Error: submitting {} failed: {}", path.display(), e);
            None
        }
    }
}

async fn send_upload(
    api: &dyn TaskApi,
    path: &Path,
    fields: Vec<FormField>,
) -> taskwatch_client::Result<SubmitResponse> {
    let form = read_form(path, fields).await?;
    api.submit(form).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TaskBoard;
    use crate::scheduler::testing::{FakeApi, Step};
    use crate::scheduler::{TaskPoller, TaskTracker};
    use std::io::Write;
    use taskwatch_core::domain::task::TaskPhase;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_upload_opens_task_entry() {
        let api = Arc::new(FakeApi::new());
        api.accept_next("abc");
        api.script(&TaskId::from("abc"), [Step::status("running")]);
        let board = Arc::new(TaskBoard::new());
        let poller = Arc::new(TaskPoller::new(
            api.clone(),
            Arc::clone(&board),
            &Config::default(),
        ));
        let tracker = TaskTracker::new(poller, Arc::clone(&board));
        let file = csv_file("rooms,area\n3,120\n");

        let fields = vec![FormField {
            name: "model".to_string(),
            value: "v2".to_string(),
        }];
        let task_id = submit_upload(&*api, file.path(), fields).await.unwrap();
        assert!(tracker.track(task_id.clone()));

        let view = board.get(&task_id).unwrap();
        assert_eq!(view.key(), "task-abc");
        assert_eq!(view.status, "Processing...");

        let sent = api.submissions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, b"rooms,area\n3,120\n");
        assert!(sent[0].file_name.ends_with(".csv"));
        assert_eq!(sent[0].fields[0].name, "model");

        tracker.shutdown();
        assert_eq!(tracker.join().await[0].1, TaskPhase::Cancelled);
    }

    #[tokio::test]
    async fn test_rejected_upload_returns_none() {
        let api = FakeApi::new();
        api.reject_next(400, "Invalid file format. Please upload a CSV file.");
        let file = csv_file("not,really\n");

        assert!(submit_upload(&api, file.path(), Vec::new()).await.is_none());
        assert_eq!(api.submissions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_submit_does_not_poll() {
        let api = Arc::new(FakeApi::new());
        api.accept_next("abc");
        let file = csv_file("rooms,area\n3,120\n");

        handle_submit(
            api.clone(),
            &[file.path().to_path_buf()],
            Vec::new(),
            true,
            &Config::default(),
        )
        .await
        .unwrap();

        assert_eq!(api.submissions().len(), 1);
        assert_eq!(api.status_calls(&TaskId::from("abc")), 0);
    }

    #[tokio::test]
    async fn test_all_uploads_rejected_is_an_error() {
        let api = Arc::new(FakeApi::new());
        api.reject_next(400, "Invalid file format. Please upload a CSV file.");
        api.reject_next(500, "boom");
        let first = csv_file("a\n");
        let second = csv_file("b\n");

        let err = handle_submit(
            api.clone(),
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            Vec::new(),
            false,
            &Config::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "No upload was accepted");
        assert_eq!(api.submissions().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_watches_accepted_uploads_only() {
        let api = Arc::new(FakeApi::new());
        let abc = TaskId::from("abc");
        api.reject_next(400, "Invalid file format. Please upload a CSV file.");
        api.accept_next("abc");
        api.script(&abc, [Step::status("running"), Step::status("completed")]);
        api.set_result(&abc, serde_json::json!({"score": 0.97}));
        let rejected = csv_file("not,really\n");
        let accepted = csv_file("rooms,area\n3,120\n");

        handle_submit(
            api.clone(),
            &[rejected.path().to_path_buf(), accepted.path().to_path_buf()],
            Vec::new(),
            false,
            &Config::default(),
        )
        .await
        .unwrap();

        assert_eq!(api.submissions().len(), 2);
        assert_eq!(api.status_calls(&abc), 2);
        assert_eq!(api.result_calls(&abc), 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_not_sent() {
        let api = FakeApi::new();
        api.accept_next("abc");

        let missing = Path::new("/definitely/not/here.csv");
        assert!(submit_upload(&api, missing, Vec::new()).await.is_none());
        assert!(api.submissions().is_empty());
    }
}
