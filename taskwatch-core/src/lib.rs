//! Taskwatch Core
//!
//! Core types shared by the taskwatch client library and CLI.
//!
//! This crate contains:
//! - Domain types: task identifiers, status strings and the poll state machine
//! - DTOs: wire shapes of the prediction backend's JSON responses

pub mod domain;
pub mod dto;
