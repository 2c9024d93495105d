//! Completion log.
//!
//! Every task marked done is appended to a JSONL (JSON Lines) file with
//! file locking so concurrent processes can append safely.

use crate::{Completion, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Sink for completion records
pub trait CompletionSink {
    fn append(&mut self, completion: &Completion) -> Result<()>;
}

/// JSONL-based completion sink with file locking
pub struct JsonlCompletionLog {
    path: PathBuf,
}

impl JsonlCompletionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CompletionSink for JsonlCompletionLog {
    fn append(&mut self, completion: &Completion) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        // A crash mid-append leaves a torn last line; start on a fresh one
        let torn = ends_without_newline(&mut file)?;

        let mut writer = std::io::BufWriter::new(&file);
        if torn {
            tracing::warn!("Completion log {:?} ends with a partial line", self.path);
            writer.write_all(b"\n")?;
        }
        let line = serde_json::to_string(completion)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!(
            "Logged completion {} of task {}",
            completion.id,
            completion.task_id
        );
        Ok(())
    }
}

fn ends_without_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read every completion from a log file, oldest first
pub fn read_completions(path: &Path) -> Result<Vec<Completion>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut completions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Completion>(&line) {
            Ok(completion) => completions.push(completion),
            Err(e) => {
                tracing::warn!("Failed to parse completion at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} completions from log", completions.len());
    Ok(completions)
}

/// The `limit` most recent completions, newest first
pub fn recent_completions(path: &Path, limit: usize) -> Result<Vec<Completion>> {
    let mut completions = read_completions(path)?;
    completions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    completions.truncate(limit);
    Ok(completions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn completion(task_id: &str, minutes_ago: i64) -> Completion {
        Completion {
            id: Uuid::new_v4(),
            task_id: task_id.into(),
            title: format!("task {}", task_id),
            completed_at: Utc::now() - Duration::minutes(minutes_ago),
            next_date: Some("20240201".into()),
        }
    }

    #[test]
    fn test_append_and_read_single_completion() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("completions.jsonl");

        let record = completion("1", 0);
        let record_id = record.id;

        let mut log = JsonlCompletionLog::new(&log_path);
        log.append(&record).unwrap();

        let completions = read_completions(&log_path).unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].id, record_id);
        assert_eq!(completions[0].next_date.as_deref(), Some("20240201"));
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let completions = read_completions(&temp_dir.path().join("nope.jsonl")).unwrap();
        assert!(completions.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("completions.jsonl");

        let mut log = JsonlCompletionLog::new(&log_path);
        log.append(&completion("1", 5)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
            writeln!(file, "{{\"id\": \"truncated").unwrap();
        }
        log.append(&completion("2", 1)).unwrap();

        let completions = read_completions(&log_path).unwrap();
        assert_eq!(completions.len(), 2);
    }

    #[test]
    fn test_append_after_torn_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("completions.jsonl");

        let mut log = JsonlCompletionLog::new(&log_path);
        log.append(&completion("1", 5)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
            write!(file, "{{\"id\": \"torn").unwrap();
        }
        log.append(&completion("2", 1)).unwrap();

        let ids: Vec<_> = read_completions(&log_path)
            .unwrap()
            .into_iter()
            .map(|c| c.task_id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_recent_completions_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("completions.jsonl");

        let mut log = JsonlCompletionLog::new(&log_path);
        log.append(&completion("old", 30)).unwrap();
        log.append(&completion("newest", 1)).unwrap();
        log.append(&completion("middle", 10)).unwrap();

        let recent = recent_completions(&log_path, 2).unwrap();
        let ids: Vec<_> = recent.iter().map(|c| c.task_id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "middle"]);
    }
}
