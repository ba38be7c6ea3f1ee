//! Task repository contract and key-value implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the single JSON task collection blob.
//! - Keep encoding and key naming inside the persistence boundary.
//!
//! # Invariants
//! - The collection lives under `TASKS_KEY` as a JSON array of tasks.
//! - Every write is a full read-modify-write inside `write_locked`, including
//!   writes whose patch depends on the stored state (toggle).
//! - Read paths reject undecodable blobs, invalid tasks and duplicate ids
//!   instead of masking them.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskPatch, TaskValidationError};
use crate::store::{KeyValueStore, TASKS_KEY};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    DuplicateId(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::DuplicateId(id) => write!(f, "task id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Repository interface for the task collection.
pub trait TaskRepository {
    /// Loads the whole collection in insertion order.
    fn load_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Appends one task and returns the stored record.
    fn create_task(&self, task: &Task) -> RepoResult<Task>;
    /// Shallow-merges `patch` into the first task with `id`.
    fn update_task(&self, id: &str, patch: &TaskPatch) -> RepoResult<Task>;
    /// Flips completion state of the task with `id` in one write cycle.
    fn toggle_task(&self, id: &str) -> RepoResult<Task>;
    /// Removes every task with `id` and returns the remaining collection.
    ///
    /// Deleting a missing id leaves the collection unchanged.
    fn delete_task(&self, id: &str) -> RepoResult<Vec<Task>>;
    /// Keeps only tasks matching `keep` and returns how many were removed.
    fn retain_tasks(&self, keep: &dyn Fn(&Task) -> bool) -> RepoResult<usize>;
}

/// Task repository storing the collection as one JSON blob.
pub struct KvTaskRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying key-value store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Derives a patch from the stored task and applies it under the write lock.
    fn patch_locked(
        &self,
        id: &str,
        derive: impl FnOnce(&Task) -> TaskPatch,
    ) -> RepoResult<Task> {
        self.store.write_locked(|store| {
            let mut tasks = read_collection(store)?;
            let task = tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
            let patch = derive(task);
            task.apply(&patch)?;
            let updated = task.clone();
            write_collection(store, &tasks)?;
            Ok(updated)
        })
    }
}

impl<S: KeyValueStore> TaskRepository for KvTaskRepository<S> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        read_collection(&self.store)
    }

    fn create_task(&self, task: &Task) -> RepoResult<Task> {
        task.validate()?;

        self.store.write_locked(|store| {
            let mut tasks = read_collection(store)?;
            if tasks.iter().any(|existing| existing.id == task.id) {
                return Err(RepoError::DuplicateId(task.id.clone()));
            }
            tasks.push(task.clone());
            write_collection(store, &tasks)?;
            Ok(task.clone())
        })
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> RepoResult<Task> {
        self.patch_locked(id, |_| patch.clone())
    }

    fn toggle_task(&self, id: &str) -> RepoResult<Task> {
        self.patch_locked(id, |task| TaskPatch::completed(!task.completed))
    }

    fn delete_task(&self, id: &str) -> RepoResult<Vec<Task>> {
        self.store.write_locked(|store| {
            let mut tasks = read_collection(store)?;
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            if tasks.len() != before {
                write_collection(store, &tasks)?;
            }
            Ok(tasks)
        })
    }

    fn retain_tasks(&self, keep: &dyn Fn(&Task) -> bool) -> RepoResult<usize> {
        self.store.write_locked(|store| {
            let mut tasks = read_collection(store)?;
            let before = tasks.len();
            tasks.retain(|task| keep(task));
            let removed = before - tasks.len();
            if removed > 0 {
                write_collection(store, &tasks)?;
            }
            Ok(removed)
        })
    }
}

fn read_collection<S: KeyValueStore>(store: &S) -> RepoResult<Vec<Task>> {
    let Some(raw) = store.get_item(TASKS_KEY)? else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tasks = serde_json::from_str::<Option<Vec<Task>>>(&raw)
        .map_err(|err| RepoError::InvalidData(format!("`{TASKS_KEY}` does not decode: {err}")))?
        .unwrap_or_default();

    ensure_valid_collection(&tasks)?;
    Ok(tasks)
}

fn ensure_valid_collection(tasks: &[Task]) -> RepoResult<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        task.validate().map_err(|err| {
            RepoError::InvalidData(format!("task `{}` in `{TASKS_KEY}`: {err}", task.id))
        })?;
        if !seen.insert(task.id.as_str()) {
            return Err(RepoError::InvalidData(format!(
                "duplicate task id `{}` in `{TASKS_KEY}`",
                task.id
            )));
        }
    }
    Ok(())
}

fn write_collection<S: KeyValueStore>(store: &S, tasks: &[Task]) -> RepoResult<()> {
    let encoded = serde_json::to_string(tasks)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode tasks: {err}")))?;
    store.set_item(TASKS_KEY, &encoded)?;
    Ok(())
}
