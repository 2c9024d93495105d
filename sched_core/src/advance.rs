//! Occurrence advancers, one per rule variant.
//!
//! Each advancer returns the next qualifying date strictly after the
//! reference. None of them read the clock or log.

use crate::calendar::{last_day_of_month, latest, CalendarDate};
use crate::rule::{MonthlyRule, MAX_DAY_INTERVAL};
use crate::RepeatError;

/// Step the stored date forward one year at a time until it passes `reference`.
///
/// Each step starts from the previous candidate, so a Feb 29 task clamped
/// to Feb 28 stays on Feb 28.
pub fn advance_yearly(
    reference: CalendarDate,
    stored: CalendarDate,
) -> Result<CalendarDate, RepeatError> {
    let mut date = stored.add_years(1).ok_or(RepeatError::NoMatchingDate)?;
    while date.is_on_or_before(&reference) {
        date = date.add_years(1).ok_or(RepeatError::NoMatchingDate)?;
    }
    Ok(date)
}

/// Step the stored date forward by `n` days until it passes `reference`.
pub fn advance_every_n_days(
    reference: CalendarDate,
    stored: CalendarDate,
    n: u32,
) -> Result<CalendarDate, RepeatError> {
    if n == 0 || n > MAX_DAY_INTERVAL {
        return Err(RepeatError::InvalidDayCount);
    }

    let step = u64::from(n);
    let mut date = stored.add_days(step).ok_or(RepeatError::NoMatchingDate)?;
    while date.is_on_or_before(&reference) {
        date = date.add_days(step).ok_or(RepeatError::NoMatchingDate)?;
    }
    Ok(date)
}

/// Walk weekdays in listed order with a cursor that is never reset.
///
/// The result depends on list order: with the anchor on a Thursday,
/// `w 1,3,5` yields the next Monday, not the nearer Friday. A weekday equal
/// to the anchor's own weekday leaves the cursor in place and is not a match.
pub fn advance_weekly(
    reference: CalendarDate,
    stored: CalendarDate,
    weekdays: &[u32],
) -> Result<CalendarDate, RepeatError> {
    let anchor = latest(reference, stored);
    let mut cursor = anchor;

    for &weekday in weekdays {
        if !(1..=7).contains(&weekday) {
            return Err(RepeatError::InvalidWeekday);
        }
        cursor = cursor
            .next_weekday_from(weekday)
            .ok_or(RepeatError::NoMatchingDate)?;
        if cursor.is_strictly_after(&anchor) {
            return Ok(cursor);
        }
    }

    Err(RepeatError::NoMatchingDate)
}

/// Scan this year and next, month by month, day by day in canonical order.
///
/// A positive day past the end of a month assigns nothing and the previous
/// candidate is kept. If both years are exhausted the last candidate is
/// returned even though it is not after the anchor.
pub fn advance_monthly(
    reference: CalendarDate,
    stored: CalendarDate,
    rule: &MonthlyRule,
) -> Result<CalendarDate, RepeatError> {
    let anchor = latest(reference, stored);
    let mut candidate: Option<CalendarDate> = None;

    for offset in 0..=1 {
        let year = anchor.year() + offset;
        for &month in rule.months() {
            let last_day = last_day_of_month(year, month);
            for &day in rule.days() {
                let computed = match day {
                    -1 => CalendarDate::from_ymd(year, month, last_day),
                    -2 => CalendarDate::from_ymd(year, month, last_day - 1),
                    day => u32::try_from(day)
                        .ok()
                        .filter(|d| *d <= last_day)
                        .and_then(|d| CalendarDate::from_ymd(year, month, d)),
                };
                if computed.is_some() {
                    candidate = computed;
                }

                if let Some(date) = candidate {
                    if date.is_strictly_after(&anchor) {
                        return Ok(date);
                    }
                }
            }
        }
    }

    candidate.ok_or(RepeatError::NoMatchingDate)
}
