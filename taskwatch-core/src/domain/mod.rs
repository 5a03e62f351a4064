//! Core domain types
//!
//! A task is tracked client-side from the moment the backend hands out its
//! identifier until a terminal status is observed.

pub mod task;

pub use task::{PollDecision, TaskId, TaskPhase, TaskStatus};
