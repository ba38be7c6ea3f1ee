//! Completion-state filtering over task lists.
//!
//! # Invariants
//! - Filtering preserves collection order.
//! - Unknown labels never silently map to a narrower filter.

use crate::model::task::Task;
use serde::Serialize;

/// Completion-state view over the task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    /// Parses a filter label, case-insensitively.
    ///
    /// Accepts `all|pending|completed` and the legacy mobile labels
    /// `todas|pendientes|completadas`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "all" | "todas" => Some(Self::All),
            "pending" | "pendientes" => Some(Self::Pending),
            "completed" | "completadas" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Stable label used in logs and response envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }

    /// Keeps matching tasks in their original order.
    pub fn apply(self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|task| self.matches(task)).collect()
    }
}

/// Completion counts over a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: u32,
    pub pending: u32,
    pub completed: u32,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut summary, task| {
            summary.total += 1;
            if task.completed {
                summary.completed += 1;
            } else {
                summary.pending += 1;
            }
            summary
        })
    }
}
