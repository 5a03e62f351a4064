//! Scheduler layer of the CLI
//!
//! This layer runs one poll chain per submitted task, retries transient
//! request failures, and coordinates chains through a tracker that can stop
//! them individually or all at once.

pub mod poller;
pub mod retry;
#[cfg(test)]
pub(crate) mod testing;
pub mod tracker;

pub use poller::TaskPoller;
pub use retry::RetryPolicy;
pub use tracker::TaskTracker;
