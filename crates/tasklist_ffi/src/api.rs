//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task list use-cases to Dart via FRB.
//! - Flatten core errors into response envelopes for the UI.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the database, runs one use-case and drops the connection.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, KvTaskRepository, SqliteKvStore, Task, TaskFilter, TaskService,
    TaskServiceResult, TaskSummary,
};

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type SqliteTaskService<'conn> = TaskService<KvTaskRepository<SqliteKvStore<'conn>>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task row rendered by the list UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl From<Task> for TaskItem {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            completed: task.completed,
        }
    }
}

/// Single-task action envelope (create/toggle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Stored task on success.
    pub task: Option<TaskItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn from_result(operation: &str, message: &str, result: Result<Task, String>) -> Self {
        match result {
            Ok(task) => Self {
                ok: true,
                task: Some(task.into()),
                message: message.to_string(),
            },
            Err(err) => Self {
                ok: false,
                task: None,
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// List envelope returned by list-shaped calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    /// Tasks matching `filter`, in insertion order.
    pub items: Vec<TaskItem>,
    /// Applied filter label (`all|pending|completed`).
    pub filter: String,
    /// Counts over the whole collection, independent of `filter`.
    pub total: u32,
    pub pending: u32,
    pub completed: u32,
    pub message: String,
}

impl TaskListResponse {
    fn success(filter: TaskFilter, items: Vec<Task>, summary: TaskSummary) -> Self {
        let message = if items.is_empty() {
            "No tasks.".to_string()
        } else {
            format!("{} task(s).", items.len())
        };
        Self {
            ok: true,
            items: items.into_iter().map(TaskItem::from).collect(),
            filter: filter.as_str().to_string(),
            total: summary.total,
            pending: summary.pending,
            completed: summary.completed,
            message,
        }
    }

    fn failure(filter: TaskFilter, message: String) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            filter: filter.as_str().to_string(),
            total: 0,
            pending: 0,
            completed: 0,
            message,
        }
    }
}

/// Lists tasks for the selected filter tab.
///
/// Unknown filter labels fall back to `all`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(filter: String) -> TaskListResponse {
    let applied = TaskFilter::parse(&filter).unwrap_or_else(|| {
        warn!("event=tasks_list module=ffi status=fallback reason=unknown_filter");
        TaskFilter::All
    });
    list_response("tasks_list", applied, |_| Ok(()))
}

/// Creates a task from the input field.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Blank titles return `ok=false` and store nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(title: String) -> TaskActionResponse {
    let result = with_task_service(|service| service.create_task(&title));
    TaskActionResponse::from_result("task_create", "Task created.", result)
}

/// Flips completion state of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    let result = with_task_service(|service| service.toggle_completed(id.trim()));
    TaskActionResponse::from_result("task_toggle", "Task updated.", result)
}

/// Deletes one task and returns the remaining collection.
///
/// Deleting an unknown id succeeds with the unchanged collection.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskListResponse {
    list_response("task_delete", TaskFilter::All, |service| {
        service.delete_task(id.trim()).map(|_| ())
    })
}

/// Removes completed tasks and returns the remaining collection.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_completed() -> TaskListResponse {
    list_response("tasks_clear_completed", TaskFilter::All, |service| {
        service.clear_completed().map(|_| ())
    })
}

fn list_response(
    operation: &str,
    filter: TaskFilter,
    mutate: impl FnOnce(&SqliteTaskService<'_>) -> TaskServiceResult<()>,
) -> TaskListResponse {
    let result = with_task_service(|service| {
        mutate(service)?;
        let items = service.list_tasks(filter)?;
        let summary = service.summary()?;
        Ok((items, summary))
    });

    match result {
        Ok((items, summary)) => TaskListResponse::success(filter, items, summary),
        Err(err) => TaskListResponse::failure(filter, format!("{operation} failed: {err}")),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH.get_or_init(|| CoreConfig::from_env().db_path).clone()
}

fn with_task_service<T>(
    f: impl FnOnce(&SqliteTaskService<'_>) -> TaskServiceResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("task DB open failed: {err}"))?;
    let service = TaskService::new(KvTaskRepository::new(SqliteKvStore::new(&conn)));
    f(&service).map_err(|err| err.to_string())
}
