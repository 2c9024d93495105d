#![forbid(unsafe_code)]

//! Core domain model and business logic for the sched task scheduler.
//!
//! This crate provides:
//! - Recurrence rules and the next-date evaluator
//! - Calendar arithmetic on `YYYYMMDD` dates
//! - Task types and the task service
//! - Persistence (task store, completion log, CSV export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod calendar;
pub mod rule;
pub mod advance;
pub mod repeat;
pub mod store;
pub mod history;
pub mod export;
pub mod service;

// Re-export commonly used types
pub use error::{Error, RepeatError, Result};
pub use types::*;
pub use config::Config;
pub use calendar::CalendarDate;
pub use rule::{MonthlyRule, RecurrenceRule};
pub use repeat::{next_date, next_occurrence};
pub use store::TaskStore;
pub use history::{CompletionSink, JsonlCompletionLog};
pub use service::TaskService;
