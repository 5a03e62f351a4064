//! Data Transfer Objects for the prediction backend
//!
//! Lightweight representations of the JSON bodies exchanged with the
//! `/predict`, `/status` and `/results` endpoints.

pub mod task;
