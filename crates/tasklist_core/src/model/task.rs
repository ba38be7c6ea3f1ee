//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record stored in the task collection blob.
//! - Provide merge-patch semantics used by update paths.
//!
//! # Invariants
//! - `id` is non-empty and unique inside one collection.
//! - `title` is non-empty after trimming.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one task.
///
/// New ids are epoch milliseconds rendered as decimal text; imported ids are
/// kept verbatim.
pub type TaskId = String;

/// Validation errors for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id cannot be empty"),
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Serialized as `{"id": "...", "title": "...", "completed": false}`, which is
/// the shape already present in on-device collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Shallow merge patch for an existing task.
///
/// `None` fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only sets completion state.
    pub fn completed(value: bool) -> Self {
        Self {
            title: None,
            completed: Some(value),
        }
    }

    /// Patch that only replaces the title.
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            completed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

impl Task {
    /// Creates a pending task with a trimmed title.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `EmptyTitle` when `title` is blank after trimming.
    pub fn new(
        id: impl Into<TaskId>,
        title: impl AsRef<str>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id: id.into(),
            title: title.as_ref().trim().to_string(),
            completed: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Merges present patch fields into this task.
    ///
    /// The task is left untouched when the merged result would be invalid.
    pub fn apply(&mut self, patch: &TaskPatch) -> Result<(), TaskValidationError> {
        let mut merged = self.clone();
        if let Some(title) = patch.title.as_deref() {
            merged.title = title.trim().to_string();
        }
        if let Some(completed) = patch.completed {
            merged.completed = completed;
        }
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Returns a copy with completion state inverted.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPatch, TaskValidationError};

    #[test]
    fn new_trims_title_and_starts_pending() {
        let task = Task::new("1", "  buy milk ").unwrap();
        assert_eq!(task.title, "buy milk");
        assert!(!task.completed);
    }

    #[test]
    fn apply_rejects_blank_title_and_keeps_original() {
        let mut task = Task::new("1", "keep me").unwrap();
        let err = task.apply(&TaskPatch::title("   ")).unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyTitle);
        assert_eq!(task.title, "keep me");
    }

    #[test]
    fn empty_patch_is_noop() {
        let mut task = Task::new("1", "same").unwrap();
        let before = task.clone();
        assert!(TaskPatch::default().is_empty());
        task.apply(&TaskPatch::default()).unwrap();
        assert_eq!(task, before);
    }
}
