//! Task domain types.
//!
//! Dates on tasks stay in their textual `YYYYMMDD` form; they are parsed
//! into [`crate::CalendarDate`] only where arithmetic is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Tasks
// ============================================================================

/// A stored task
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

/// Task fields as submitted by a client, before an id is assigned
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NewTask {
    #[serde(default)]
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

impl NewTask {
    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            date: self.date,
            title: self.title,
            comment: self.comment,
            repeat: self.repeat,
        }
    }
}

/// Everything persisted in `tasks.json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskBook {
    pub next_id: u64,
    pub tasks: Vec<Task>,
}

impl Default for TaskBook {
    fn default() -> Self {
        Self {
            next_id: 1,
            tasks: Vec::new(),
        }
    }
}

// ============================================================================
// Completion history
// ============================================================================

/// One line of the completion log, written each time a task is marked done
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    pub id: Uuid,
    pub task_id: String,
    pub title: String,
    pub completed_at: DateTime<Utc>,
    /// Date the task was moved to, `None` when it was deleted
    pub next_date: Option<String>,
}

/// What happened to a task marked done
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Recurring task moved to its next date
    Rescheduled(String),
    /// One-off task removed
    Deleted,
}
