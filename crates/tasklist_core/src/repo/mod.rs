//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented task collection access.
//! - Isolate blob encoding and key-value details from services.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateId`) in
//!   addition to storage transport errors.

pub mod task_repo;
