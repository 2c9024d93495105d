//! Calendar arithmetic shared by the recurrence advancers.
//!
//! All month and year stepping follows chrono's clamping convention:
//! Jan 31 + 1 month is the last day of February, Feb 29 + 1 year is Feb 28.

use crate::RepeatError;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A date without time of day, textually `YYYYMMDD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from components, `None` for impossible combinations
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse the compact `YYYYMMDD` form
    ///
    /// Exactly eight ASCII digits are required; anything else, including
    /// impossible dates such as `20230229`, is `InvalidStoredDate`.
    pub fn parse(s: &str) -> Result<Self, RepeatError> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RepeatError::InvalidStoredDate);
        }

        let year: i32 = s[0..4].parse().map_err(|_| RepeatError::InvalidStoredDate)?;
        let month: u32 = s[4..6].parse().map_err(|_| RepeatError::InvalidStoredDate)?;
        let day: u32 = s[6..8].parse().map_err(|_| RepeatError::InvalidStoredDate)?;

        Self::from_ymd(year, month, day).ok_or(RepeatError::InvalidStoredDate)
    }

    /// Parse the `DD.MM.YYYY` form people type into task search
    pub fn parse_display(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%d.%m.%Y").ok().map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// ISO weekday number, 1 = Monday .. 7 = Sunday
    pub fn iso_weekday(&self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    pub fn add_days(&self, n: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(n)).map(Self)
    }

    pub fn add_months(&self, n: u32) -> Option<Self> {
        self.0.checked_add_months(Months::new(n)).map(Self)
    }

    pub fn add_years(&self, n: u32) -> Option<Self> {
        n.checked_mul(12).and_then(|months| self.add_months(months))
    }

    pub fn is_strictly_after(&self, other: &Self) -> bool {
        self > other
    }

    pub fn is_on_or_before(&self, other: &Self) -> bool {
        self <= other
    }

    /// Step forward one day at a time until the ISO weekday matches.
    ///
    /// Returns `self` unchanged when it already falls on `weekday`.
    pub fn next_weekday_from(&self, weekday: u32) -> Option<Self> {
        if !(1..=7).contains(&weekday) {
            return None;
        }

        let mut cursor = *self;
        while cursor.iso_weekday() != weekday {
            cursor = cursor.add_days(1)?;
        }
        Some(cursor)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for CalendarDate {
    type Err = RepeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Number of the last day of `month` in `year` (28..=31)
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

/// The later of two dates
pub fn latest(a: CalendarDate, b: CalendarDate) -> CalendarDate {
    if a.is_strictly_after(&b) {
        a
    } else {
        b
    }
}
