//! Task board
//!
//! In-memory presentation registry: one entry per task, keyed by task id,
//! with a title, a status region and a result region. Entries are never
//! removed. When echo is enabled, every visible change is printed as one line.

use chrono::{DateTime, Utc};
use colored::*;
use indexmap::IndexMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use taskwatch_core::domain::task::{TaskId, TaskPhase, TaskStatus};

/// Status text shown before the first status response
pub const INITIAL_STATUS: &str = "Processing...";

/// Result text shown until the task ends
pub const INITIAL_RESULT: &str = "Waiting for results...";

/// Presentation of a single task
#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: TaskId,
    /// Title region (`Task ID: {id}`)
    pub title: String,
    /// Status region, the last status string observed
    pub status: String,
    /// Result region, the rendered payload or error message
    pub result: String,
    pub phase: TaskPhase,
    pub opened_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskView {
    fn new(id: TaskId) -> Self {
        Self {
            title: format!("Task ID: {}", id),
            id,
            status: INITIAL_STATUS.to_string(),
            result: INITIAL_RESULT.to_string(),
            phase: TaskPhase::Pending,
            opened_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Key of the container holding this view
    pub fn key(&self) -> String {
        self.id.container_key()
    }

    /// Only the result region and explicit marks end a view; a terminal
    /// status still has its result fetch ahead of it.
    fn set_phase(&mut self, phase: TaskPhase) {
        self.phase = phase;
        if phase.is_final() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }
}

/// Registry of task views
#[derive(Debug, Default)]
pub struct TaskBoard {
    views: Mutex<IndexMap<TaskId, TaskView>>,
    echo: bool,
}

impl TaskBoard {
    /// Creates a board that keeps state without printing
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board that prints every visible change to stdout
    pub fn with_echo() -> Self {
        Self {
            views: Mutex::default(),
            echo: true,
        }
    }

    fn views(&self) -> MutexGuard<'_, IndexMap<TaskId, TaskView>> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a view for a task
    ///
    /// # Returns
    /// `false` if the task already has a view; the existing one is kept.
    pub fn open(&self, id: &TaskId) -> bool {
        let mut views = self.views();
        if views.contains_key(id) {
            return false;
        }

        let view = TaskView::new(id.clone());
        if self.echo {
            println!(
                "{} {}  {}",
                "▸".cyan(),
                view.title.bold(),
                view.status.dimmed()
            );
        }
        views.insert(id.clone(), view);
        true
    }

    /// Shows a status response in the task's status region
    ///
    /// Returns `false` if the task has no view.
    pub fn show_status(&self, id: &TaskId, status: &TaskStatus) -> bool {
        let mut views = self.views();
        let Some(view) = views.get_mut(id) else {
            return false;
        };

        let changed = view.status != status.as_str();
        view.status = status.as_str().to_string();
        view.phase = status.phase();

        if self.echo && changed {
            println!(
                "  {} {}",
                id.status_key().dimmed(),
                colorize_phase(view.phase, &view.status)
            );
        }
        true
    }

    /// Writes text into the task's result region and moves it to `phase`
    ///
    /// Returns `false` if the task has no view.
    pub fn show_result(&self, id: &TaskId, text: &str, phase: TaskPhase) -> bool {
        let mut views = self.views();
        let Some(view) = views.get_mut(id) else {
            return false;
        };

        view.result = text.to_string();
        view.set_phase(phase);

        if self.echo {
            println!("  {}", id.result_key().dimmed());
            for line in text.lines() {
                println!("    {}", colorize_phase(phase, line));
            }
        }
        true
    }

    /// Moves a task to `phase` without touching its regions
    pub fn mark(&self, id: &TaskId, phase: TaskPhase) -> bool {
        let mut views = self.views();
        let Some(view) = views.get_mut(id) else {
            return false;
        };

        view.set_phase(phase);
        if self.echo {
            println!(
                "  {} {}",
                id.container_key().dimmed(),
                colorize_phase(phase, &format!("{:?}", phase))
            );
        }
        true
    }

    /// Returns a copy of a task's view
    #[cfg(test)]
    pub fn get(&self, id: &TaskId) -> Option<TaskView> {
        self.views().get(id).cloned()
    }

    /// Returns copies of all views, in the order the tasks were opened
    pub fn snapshot(&self) -> Vec<TaskView> {
        self.views().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.views().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views().is_empty()
    }

    /// Prints every view as a block
    pub fn print_summary(&self) {
        if self.is_empty() {
            println!("{}", "No tasks tracked.".yellow());
            return;
        }

        let views = self.snapshot();

        println!();
        println!("{}", format!("{} task(s):", views.len()).bold());
        for view in views {
            print_view(&view);
        }
    }
}

/// Print a task view as a detail block
fn print_view(view: &TaskView) {
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", view.title.bold());
    println!("  Status:  {}", colorize_phase(view.phase, &view.status));
    println!(
        "  Opened:  {}",
        view.opened_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
    if let Some(finished) = view.finished_at {
        let seconds = finished.signed_duration_since(view.opened_at).num_seconds();
        println!("  Elapsed: {}s", seconds);
    }
    println!("  Result:");
    for line in view.result.lines() {
        println!("    {}", line);
    }
}

/// Colorize text according to a task phase
pub(crate) fn colorize_phase(phase: TaskPhase, text: &str) -> ColoredString {
    match phase {
        TaskPhase::Pending => text.dimmed(),
        TaskPhase::InProgress => text.cyan(),
        TaskPhase::Completed => text.green(),
        TaskPhase::Failed | TaskPhase::Unreachable => text.red(),
        TaskPhase::Cancelled => text.yellow(),
    }
}
