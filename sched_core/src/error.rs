//! Error types for the sched_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds reported by the recurrence evaluator.
///
/// Every kind is local and non-retriable: a malformed rule stays malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RepeatError {
    /// The rule string was empty
    #[error("no repeat rule given")]
    MissingRule,

    /// The stored task date is not a valid YYYYMMDD date
    #[error("task date is not a valid YYYYMMDD date")]
    InvalidStoredDate,

    /// Unknown rule letter or malformed rule body
    #[error("unsupported repeat rule format")]
    UnsupportedRule,

    /// `d` rule interval missing, non-numeric or outside 1..=400
    #[error("day interval must be an integer between 1 and 400")]
    InvalidDayCount,

    /// `w` rule weekday outside 1..=7
    #[error("weekday must be an integer between 1 and 7")]
    InvalidWeekday,

    /// `m` rule day outside -2, -1, 1..=31
    #[error("month day must be -2, -1 or an integer between 1 and 31")]
    InvalidMonthlyDay,

    /// `m` rule month outside 1..=12
    #[error("month must be an integer between 1 and 12")]
    InvalidMonth,

    /// The rule admits no date after the reference
    #[error("no matching date for repeat rule")]
    NoMatchingDate,
}

/// Core error type for sched_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Recurrence rule evaluation error
    #[error("Repeat rule error: {0}")]
    Repeat(#[from] RepeatError),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Task input rejected before reaching the store
    #[error("Invalid task: {0}")]
    Validation(String),

    /// No task with the given id
    #[error("Task not found: {0}")]
    TaskNotFound(String),
}
