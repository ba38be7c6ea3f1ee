//! Core domain logic for the task list app.
//! This crate is the single source of truth for task storage invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::filter::{TaskFilter, TaskSummary};
pub use model::task::{Task, TaskId, TaskPatch, TaskValidationError};
pub use repo::task_repo::{KvTaskRepository, RepoError, RepoResult, TaskRepository};
pub use service::task_service::{TaskService, TaskServiceError, TaskServiceResult};
pub use store::{KeyValueStore, MemoryKvStore, SqliteKvStore, TASKS_KEY};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
