//! Next-occurrence evaluation for recurring tasks.
//!
//! [`next_date`] is a pure function of its three inputs. The reference date
//! is always supplied by the caller; nothing here reads the clock.

use crate::advance::{advance_every_n_days, advance_monthly, advance_weekly, advance_yearly};
use crate::calendar::CalendarDate;
use crate::rule::RecurrenceRule;
use crate::RepeatError;

/// Compute the next occurrence of a typed rule after `reference`.
pub fn next_occurrence(
    reference: CalendarDate,
    stored: CalendarDate,
    rule: &RecurrenceRule,
) -> Result<CalendarDate, RepeatError> {
    match rule {
        RecurrenceRule::Yearly => advance_yearly(reference, stored),
        RecurrenceRule::EveryNDays { n } => advance_every_n_days(reference, stored, *n),
        RecurrenceRule::WeeklyOn { weekdays } => advance_weekly(reference, stored, weekdays),
        RecurrenceRule::MonthlyOn(monthly) => advance_monthly(reference, stored, monthly),
    }
}

/// Compute the next date, as `YYYYMMDD`, on which a task stored on `date`
/// with rule `repeat` recurs after `reference`.
///
/// Checks run in a fixed order: missing rule, stored date, rule syntax,
/// then the advancer itself.
pub fn next_date(reference: CalendarDate, date: &str, repeat: &str) -> Result<String, RepeatError> {
    if repeat.is_empty() {
        return Err(RepeatError::MissingRule);
    }

    let stored = CalendarDate::parse(date)?;
    let rule = RecurrenceRule::parse(repeat)?;
    let next = next_occurrence(reference, stored, &rule)?;

    Ok(next.to_string())
}
