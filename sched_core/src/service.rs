//! Task management on top of the store and the recurrence evaluator.
//!
//! Every operation that needs "today" takes it as an argument, so the
//! service never reads the clock to decide dates.

use crate::config::TasksConfig;
use crate::history::{recent_completions, CompletionSink, JsonlCompletionLog};
use crate::{
    next_date, CalendarDate, Completion, CompletionOutcome, Error, NewTask, RecurrenceRule,
    Result, Task, TaskStore,
};
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

pub const TASKS_FILE: &str = "tasks.json";
pub const COMPLETIONS_FILE: &str = "completions.jsonl";

/// Validates tasks, schedules recurring ones and records completions
pub struct TaskService {
    store: TaskStore,
    log: JsonlCompletionLog,
    limits: TasksConfig,
}

impl TaskService {
    pub fn new(store: TaskStore, log: JsonlCompletionLog, limits: TasksConfig) -> Self {
        Self { store, log, limits }
    }

    /// Service over the standard files inside `data_dir`
    pub fn open(data_dir: &Path, limits: TasksConfig) -> Self {
        Self::new(
            TaskStore::new(data_dir.join(TASKS_FILE)),
            JsonlCompletionLog::new(data_dir.join(COMPLETIONS_FILE)),
            limits,
        )
    }

    /// Validate and store a new task, returning its id
    ///
    /// An empty date means today. A date in the past moves to today, or to
    /// the next occurrence when the task repeats.
    pub fn add_task(&self, mut task: NewTask, today: CalendarDate) -> Result<String> {
        require_title(&task.title)?;
        task.date = schedule_date(&task.date, &task.repeat, today)?;
        self.store.add(task)
    }

    /// Validate and replace an existing task
    pub fn edit_task(&self, mut task: Task, today: CalendarDate) -> Result<()> {
        if task.id.trim().is_empty() {
            return Err(Error::Validation("task id is required".into()));
        }
        require_title(&task.title)?;
        task.date = schedule_date(&task.date, &task.repeat, today)?;
        self.store.update(task)
    }

    pub fn get_task(&self, id: &str) -> Result<Task> {
        self.store.get(id)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.store.list(self.limits.list_limit)
    }

    /// Search by exact date when `query` reads as `DD.MM.YYYY`, by text otherwise
    pub fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_tasks();
        }

        match CalendarDate::parse_display(query) {
            Some(date) => self.store.search_by_date(&date.to_string()),
            None => self.store.search_by_text(query, self.limits.search_limit),
        }
    }

    pub fn delete_task(&self, id: &str) -> Result<()> {
        self.store.delete(id).map(|_| ())
    }

    /// Mark a task done
    ///
    /// One-off tasks are deleted; recurring tasks move to their next date.
    /// The completion record is appended once the task change is saved. A
    /// failed append is logged and does not undo the completion.
    pub fn complete_task(&mut self, id: &str, today: CalendarDate) -> Result<CompletionOutcome> {
        let (task, outcome) = self.store.complete(id, today)?;

        let record = Completion {
            id: Uuid::new_v4(),
            task_id: task.id,
            title: task.title,
            completed_at: Utc::now(),
            next_date: match &outcome {
                CompletionOutcome::Rescheduled(date) => Some(date.clone()),
                CompletionOutcome::Deleted => None,
            },
        };
        if let Err(e) = self.log.append(&record) {
            tracing::error!("Failed to log completion of task {}: {}", record.task_id, e);
        }

        Ok(outcome)
    }

    /// The most recent completions, newest first
    pub fn history(&self, limit: usize) -> Result<Vec<Completion>> {
        recent_completions(self.log.path(), limit)
    }

    /// Export every task to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        let tasks = self.store.all()?;
        crate::export::export_tasks_csv(&tasks, path)
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("task title is required".into()));
    }
    Ok(())
}

/// Decide the date a task is stored under
fn schedule_date(date: &str, repeat: &str, today: CalendarDate) -> Result<String> {
    if !repeat.is_empty() {
        RecurrenceRule::parse(repeat)?;
    }

    if date.is_empty() {
        return Ok(today.to_string());
    }

    let stored = CalendarDate::parse(date)
        .map_err(|_| Error::Validation(format!("date {:?} is not in YYYYMMDD format", date)))?;

    if stored >= today {
        return Ok(date.to_string());
    }

    if repeat.is_empty() {
        Ok(today.to_string())
    } else {
        Ok(next_date(today, date, repeat)?)
    }
}
