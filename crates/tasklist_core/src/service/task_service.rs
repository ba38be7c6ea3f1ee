//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/toggle/rename/delete/list entry points for UI callers.
//! - Own id generation and title normalization for new tasks.
//!
//! # Invariants
//! - Blank titles are rejected before any storage access.
//! - New ids are epoch-millisecond strings, unique in the collection.
//! - Logs carry ids and counts only, never task titles.

use crate::model::filter::{TaskFilter, TaskSummary};
use crate::model::task::{Task, TaskId, TaskPatch, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_CREATE_ATTEMPTS: usize = 3;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(TaskValidationError::EmptyTitle) => Self::EmptyTitle,
            other => Self::Repo(other),
        }
    }
}

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the system clock for new ids.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, epoch_millis)
    }

    /// Creates a service with a caller-provided epoch-millisecond clock.
    pub fn with_clock(repo: R, clock: fn() -> i64) -> Self {
        Self { repo, clock }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates one pending task from user input.
    ///
    /// # Contract
    /// - Title is trimmed; blank input returns `EmptyTitle` and stores nothing.
    /// - The id is the current epoch millisecond, bumped until unique.
    /// - Returns the stored task.
    pub fn create_task(&self, title: &str) -> TaskServiceResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            warn!("event=task_create module=service status=rejected reason=empty_title");
            return Err(TaskServiceError::EmptyTitle);
        }

        let mut candidate = (self.clock)();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let existing = self.repo.load_tasks()?;
            candidate = next_free_id(&existing, candidate);
            let task = Task::new(candidate.to_string(), title).map_err(RepoError::from)?;

            match self.repo.create_task(&task) {
                Ok(created) => {
                    info!(
                        "event=task_create module=service status=ok task_id={} attempts={attempts}",
                        created.id
                    );
                    return Ok(created);
                }
                // Another writer took the id between load and create.
                Err(RepoError::DuplicateId(_)) if attempts < MAX_CREATE_ATTEMPTS => {
                    candidate += 1;
                }
                Err(err) => {
                    warn!(
                        "event=task_create module=service status=error attempts={attempts} error={err}"
                    );
                    return Err(err.into());
                }
            }
        }
    }

    /// Flips completion state of one task and returns the updated record.
    pub fn toggle_completed(&self, id: &str) -> TaskServiceResult<Task> {
        let updated = self.repo.toggle_task(id)?;
        info!(
            "event=task_toggle module=service status=ok task_id={} completed={}",
            updated.id, updated.completed
        );
        Ok(updated)
    }

    /// Sets completion state of one task.
    pub fn set_completed(&self, id: &str, completed: bool) -> TaskServiceResult<Task> {
        let updated = self
            .repo
            .update_task(id, &TaskPatch::completed(completed))?;
        info!(
            "event=task_update module=service status=ok task_id={} completed={}",
            updated.id, updated.completed
        );
        Ok(updated)
    }

    /// Replaces the title of one task.
    pub fn rename_task(&self, id: &str, title: &str) -> TaskServiceResult<Task> {
        if title.trim().is_empty() {
            return Err(TaskServiceError::EmptyTitle);
        }
        let updated = self.repo.update_task(id, &TaskPatch::title(title))?;
        info!(
            "event=task_rename module=service status=ok task_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Deletes one task and returns the remaining collection.
    ///
    /// Deleting an unknown id succeeds and returns the unchanged collection.
    pub fn delete_task(&self, id: &str) -> TaskServiceResult<Vec<Task>> {
        let remaining = self.repo.delete_task(id)?;
        info!(
            "event=task_delete module=service status=ok task_id={id} remaining={}",
            remaining.len()
        );
        Ok(remaining)
    }

    /// Removes all completed tasks and returns how many were removed.
    pub fn clear_completed(&self) -> TaskServiceResult<usize> {
        let removed = self
            .repo
            .retain_tasks(&|task| TaskFilter::Pending.matches(task))?;
        info!("event=task_clear_completed module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Lists tasks matching `filter` in insertion order.
    pub fn list_tasks(&self, filter: TaskFilter) -> TaskServiceResult<Vec<Task>> {
        Ok(filter.apply(self.repo.load_tasks()?))
    }

    /// Returns completion counts for the whole collection.
    pub fn summary(&self) -> TaskServiceResult<TaskSummary> {
        Ok(TaskSummary::from_tasks(&self.repo.load_tasks()?))
    }
}

fn next_free_id(tasks: &[Task], mut candidate: i64) -> i64 {
    while tasks.iter().any(|task| task.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
