//! Task domain model and list views.
//!
//! # Responsibility
//! - Define the task record persisted in the collection blob.
//! - Provide completion-state filtering and summary counts.

pub mod filter;
pub mod task;
