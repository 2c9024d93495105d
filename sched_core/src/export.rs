//! CSV export of the task list.

use crate::{Result, Task};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    date: &'a str,
    title: &'a str,
    comment: &'a str,
    repeat: &'a str,
}

impl<'a> From<&'a Task> for CsvRow<'a> {
    fn from(task: &'a Task) -> Self {
        CsvRow {
            id: &task.id,
            date: &task.date,
            title: &task.title,
            comment: &task.comment,
            repeat: &task.repeat,
        }
    }
}

/// Write tasks to `path` as CSV with a header row, replacing any existing file
///
/// The file is fsynced before returning. Returns the number of rows written.
pub fn export_tasks_csv(tasks: &[Task], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for task in tasks {
        writer.serialize(CsvRow::from(task))?;
    }

    // An empty export still gets a header line
    if tasks.is_empty() {
        writer.write_record(["id", "date", "title", "comment", "repeat"])?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} tasks to {:?}", tasks.len(), path);
    Ok(tasks.len())
}
