//! Task persistence with file locking.
//!
//! All tasks live in a single JSON document. Every mutation holds an
//! exclusive lock on a sibling `.lock` file for the whole
//! load-modify-save cycle, so concurrent processes never lose updates.

use crate::{next_date, CalendarDate, CompletionOutcome, Error, NewTask, Result, Task, TaskBook};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON-file backed task store
pub struct TaskStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl TaskStore {
    /// Create a store for the given `tasks.json` path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        Ok(file)
    }

    /// Load the whole task book under a shared lock
    ///
    /// A missing file is an empty book. A corrupted file is an error:
    /// task data is never silently replaced.
    pub fn load(&self) -> Result<TaskBook> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.read_book();
        lock.unlock()?;
        result
    }

    fn read_book(&self) -> Result<TaskBook> {
        if !self.path.exists() {
            tracing::debug!("No task file at {:?}, starting empty", self.path);
            return Ok(TaskBook::default());
        }

        let mut contents = String::new();
        File::open(&self.path)?.read_to_string(&mut contents)?;

        let book: TaskBook = serde_json::from_str(&contents).map_err(|e| {
            tracing::error!("Task file {:?} is corrupted: {}", self.path, e);
            Error::Json(e)
        })?;
        Ok(book)
    }

    /// Atomically replace the task file
    fn write_book(&self, book: &TaskBook) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "task path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(book)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} tasks to {:?}", book.tasks.len(), self.path);
        Ok(())
    }

    /// Load, modify and save the book while holding the exclusive lock
    fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TaskBook) -> Result<T>,
    {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.read_book().and_then(|mut book| {
            let value = f(&mut book)?;
            self.write_book(&book)?;
            Ok(value)
        });

        lock.unlock()?;
        result
    }

    /// Insert a new task and return its assigned id
    pub fn add(&self, task: NewTask) -> Result<String> {
        self.modify(|book| {
            let id = book.next_id.to_string();
            book.next_id += 1;
            book.tasks.push(task.into_task(id.clone()));
            tracing::info!("Added task {}", id);
            Ok(id)
        })
    }

    /// Replace an existing task
    pub fn update(&self, task: Task) -> Result<()> {
        self.modify(|book| {
            let slot = book
                .tasks
                .iter_mut()
                .find(|t| t.id == task.id)
                .ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;
            tracing::info!("Updated task {}", task.id);
            *slot = task;
            Ok(())
        })
    }

    /// Remove a task, returning what was removed
    pub fn delete(&self, id: &str) -> Result<Task> {
        self.modify(|book| {
            let index = book
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            tracing::info!("Deleted task {}", id);
            Ok(book.tasks.remove(index))
        })
    }

    /// Mark a task done under one exclusive lock
    ///
    /// A one-off task is removed. A recurring task moves to its next date,
    /// computed from the date stored at the moment the lock is held, so
    /// concurrent completions each advance the task once.
    pub fn complete(&self, id: &str, today: CalendarDate) -> Result<(Task, CompletionOutcome)> {
        self.modify(|book| {
            let index = book
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

            if book.tasks[index].repeat.is_empty() {
                let task = book.tasks.remove(index);
                tracing::info!("Completed and removed task {}", id);
                return Ok((task, CompletionOutcome::Deleted));
            }

            let task = &mut book.tasks[index];
            let next = next_date(today, &task.date, &task.repeat)?;
            tracing::info!("Completed task {}, {} -> {}", id, task.date, next);
            task.date = next.clone();
            Ok((task.clone(), CompletionOutcome::Rescheduled(next)))
        })
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        self.load()?
            .tasks
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    /// All tasks, latest date first
    pub fn all(&self) -> Result<Vec<Task>> {
        let mut tasks = self.load()?.tasks;
        sort_by_date(&mut tasks);
        Ok(tasks)
    }

    /// Up to `limit` tasks, latest date first
    pub fn list(&self, limit: usize) -> Result<Vec<Task>> {
        let mut tasks = self.all()?;
        tasks.truncate(limit);
        Ok(tasks)
    }

    /// Tasks scheduled exactly on `date` (`YYYYMMDD`)
    pub fn search_by_date(&self, date: &str) -> Result<Vec<Task>> {
        let tasks = self.all()?.into_iter().filter(|t| t.date == date).collect();
        Ok(tasks)
    }

    /// Tasks whose title or comment contains `text`, ignoring case
    pub fn search_by_text(&self, text: &str, limit: usize) -> Result<Vec<Task>> {
        let needle = text.to_lowercase();
        let tasks = self
            .all()?
            .into_iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.comment.to_lowercase().contains(&needle)
            })
            .take(limit)
            .collect();
        Ok(tasks)
    }
}

fn sort_by_date(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| id_key(&a.id).cmp(&id_key(&b.id)))
    });
}

fn id_key(id: &str) -> u64 {
    id.parse().unwrap_or(u64::MAX)
}
