//! Recurrence rule grammar.
//!
//! ```text
//! y
//! d <1-400>
//! w <comma-list of 1-7>
//! m <comma-list of -2,-1,1-31>[ <comma-list of 1-12>]
//! ```
//!
//! Rules are parsed once at the boundary; the advancers only ever see
//! the typed [`RecurrenceRule`].

use crate::RepeatError;
use std::fmt;
use std::str::FromStr;

pub const MAX_DAY_INTERVAL: u32 = 400;

/// A parsed recurrence rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Same month and day every year
    Yearly,
    /// Every `n` days from the stored date
    EveryNDays { n: u32 },
    /// On ISO weekdays (1 = Monday), in listed order
    WeeklyOn { weekdays: Vec<u32> },
    /// On given days of given months
    MonthlyOn(MonthlyRule),
}

/// Day and month sets of an `m` rule, kept in canonical evaluation order.
///
/// Days: positive ascending, then negative ascending (`-2` before `-1`).
/// Months: ascending, all twelve when the rule names none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyRule {
    days: Vec<i32>,
    months: Vec<u32>,
}

impl MonthlyRule {
    pub fn new(days: Vec<i32>, months: Option<Vec<u32>>) -> Result<Self, RepeatError> {
        if days.is_empty() {
            return Err(RepeatError::UnsupportedRule);
        }
        if days.iter().any(|d| !is_valid_month_day(*d)) {
            return Err(RepeatError::InvalidMonthlyDay);
        }

        let months = match months {
            Some(months) => {
                if months.is_empty() {
                    return Err(RepeatError::UnsupportedRule);
                }
                if months.iter().any(|m| !(1..=12).contains(m)) {
                    return Err(RepeatError::InvalidMonth);
                }
                months
            }
            None => (1..=12).collect(),
        };

        Ok(Self {
            days: canonical_days(days),
            months: sorted_unique(months),
        })
    }

    pub fn days(&self) -> &[i32] {
        &self.days
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    fn covers_all_months(&self) -> bool {
        self.months.len() == 12
    }
}

fn is_valid_month_day(day: i32) -> bool {
    day == -1 || day == -2 || (1..=31).contains(&day)
}

fn canonical_days(days: Vec<i32>) -> Vec<i32> {
    let (mut positive, mut negative): (Vec<i32>, Vec<i32>) = days.into_iter().partition(|d| *d > 0);
    positive.sort_unstable();
    positive.dedup();
    negative.sort_unstable();
    negative.dedup();
    positive.extend(negative);
    positive
}

fn sorted_unique(mut values: Vec<u32>) -> Vec<u32> {
    values.sort_unstable();
    values.dedup();
    values
}

impl RecurrenceRule {
    pub fn every_n_days(n: u32) -> Result<Self, RepeatError> {
        if n == 0 || n > MAX_DAY_INTERVAL {
            return Err(RepeatError::InvalidDayCount);
        }
        Ok(Self::EveryNDays { n })
    }

    pub fn weekly(weekdays: Vec<u32>) -> Result<Self, RepeatError> {
        if weekdays.is_empty() {
            return Err(RepeatError::UnsupportedRule);
        }
        if weekdays.iter().any(|w| !(1..=7).contains(w)) {
            return Err(RepeatError::InvalidWeekday);
        }
        Ok(Self::WeeklyOn { weekdays })
    }

    pub fn monthly(days: Vec<i32>, months: Option<Vec<u32>>) -> Result<Self, RepeatError> {
        MonthlyRule::new(days, months).map(Self::MonthlyOn)
    }

    /// Parse a rule string
    pub fn parse(rule: &str) -> Result<Self, RepeatError> {
        if rule.is_empty() {
            return Err(RepeatError::MissingRule);
        }

        let tokens: Vec<&str> = rule.split(' ').collect();
        match tokens.as_slice() {
            ["y"] => Ok(Self::Yearly),
            ["d", count] => {
                let n = count.parse::<u32>().map_err(|_| RepeatError::InvalidDayCount)?;
                Self::every_n_days(n)
            }
            ["w", list] => {
                let weekdays = parse_list(list, RepeatError::InvalidWeekday)?;
                Self::weekly(weekdays)
            }
            ["m", days] => {
                let days = parse_list(days, RepeatError::InvalidMonthlyDay)?;
                Self::monthly(days, None)
            }
            ["m", days, months] => {
                let days = parse_list(days, RepeatError::InvalidMonthlyDay)?;
                let months = parse_list(months, RepeatError::InvalidMonth)?;
                Self::monthly(days, Some(months))
            }
            _ => Err(RepeatError::UnsupportedRule),
        }
    }
}

/// Parse a comma-separated integer list, mapping any bad token to `err`
fn parse_list<T: FromStr>(list: &str, err: RepeatError) -> Result<Vec<T>, RepeatError> {
    if list.is_empty() {
        return Err(RepeatError::UnsupportedRule);
    }
    list.split(',')
        .map(|token| token.parse::<T>().map_err(|_| err))
        .collect()
}

impl FromStr for RecurrenceRule {
    type Err = RepeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceRule::Yearly => write!(f, "y"),
            RecurrenceRule::EveryNDays { n } => write!(f, "d {}", n),
            RecurrenceRule::WeeklyOn { weekdays } => write!(f, "w {}", join(weekdays)),
            RecurrenceRule::MonthlyOn(monthly) => {
                write!(f, "m {}", join(&monthly.days))?;
                if !monthly.covers_all_months() {
                    write!(f, " {}", join(&monthly.months))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yearly() {
        assert_eq!(RecurrenceRule::parse("y"), Ok(RecurrenceRule::Yearly));
        assert_eq!(RecurrenceRule::parse("y 1"), Err(RepeatError::UnsupportedRule));
        assert_eq!(RecurrenceRule::parse("yy"), Err(RepeatError::UnsupportedRule));
    }

    #[test]
    fn test_parse_empty_is_missing() {
        assert_eq!(RecurrenceRule::parse(""), Err(RepeatError::MissingRule));
    }

    #[test]
    fn test_parse_day_interval_bounds() {
        assert_eq!(
            RecurrenceRule::parse("d 1"),
            Ok(RecurrenceRule::EveryNDays { n: 1 })
        );
        assert_eq!(
            RecurrenceRule::parse("d 400"),
            Ok(RecurrenceRule::EveryNDays { n: 400 })
        );
        assert_eq!(RecurrenceRule::parse("d 0"), Err(RepeatError::InvalidDayCount));
        assert_eq!(RecurrenceRule::parse("d 401"), Err(RepeatError::InvalidDayCount));
        assert_eq!(RecurrenceRule::parse("d -3"), Err(RepeatError::InvalidDayCount));
        assert_eq!(RecurrenceRule::parse("d x"), Err(RepeatError::InvalidDayCount));
    }

    #[test]
    fn test_parse_day_interval_malformed_body() {
        assert_eq!(RecurrenceRule::parse("d"), Err(RepeatError::UnsupportedRule));
        assert_eq!(RecurrenceRule::parse("d 5 6"), Err(RepeatError::UnsupportedRule));
        assert_eq!(RecurrenceRule::parse("d  5"), Err(RepeatError::UnsupportedRule));
    }

    #[test]
    fn test_parse_weekly_keeps_listed_order() {
        assert_eq!(
            RecurrenceRule::parse("w 5,1,3"),
            Ok(RecurrenceRule::WeeklyOn {
                weekdays: vec![5, 1, 3]
            })
        );
        assert_eq!(RecurrenceRule::parse("w 7"), Ok(RecurrenceRule::WeeklyOn { weekdays: vec![7] }));
    }

    #[test]
    fn test_parse_weekly_rejects_bad_weekdays() {
        assert_eq!(RecurrenceRule::parse("w 0"), Err(RepeatError::InvalidWeekday));
        assert_eq!(RecurrenceRule::parse("w 1,8"), Err(RepeatError::InvalidWeekday));
        assert_eq!(RecurrenceRule::parse("w 1,,2"), Err(RepeatError::InvalidWeekday));
        assert_eq!(RecurrenceRule::parse("w mon"), Err(RepeatError::InvalidWeekday));
        assert_eq!(RecurrenceRule::parse("w"), Err(RepeatError::UnsupportedRule));
    }

    #[test]
    fn test_parse_monthly_canonical_day_order() {
        let a = RecurrenceRule::parse("m -1,15,-2,1").unwrap();
        let b = RecurrenceRule::parse("m 1,-2,15,-1").unwrap();
        assert_eq!(a, b);

        match a {
            RecurrenceRule::MonthlyOn(monthly) => {
                assert_eq!(monthly.days(), &[1, 15, -2, -1]);
                assert_eq!(monthly.months(), &(1..=12).collect::<Vec<u32>>()[..]);
            }
            other => panic!("expected monthly rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_monthly_with_months() {
        match RecurrenceRule::parse("m 10 12,3,3,6").unwrap() {
            RecurrenceRule::MonthlyOn(monthly) => {
                assert_eq!(monthly.days(), &[10]);
                assert_eq!(monthly.months(), &[3, 6, 12]);
            }
            other => panic!("expected monthly rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_monthly_rejects_bad_values() {
        assert_eq!(RecurrenceRule::parse("m 0"), Err(RepeatError::InvalidMonthlyDay));
        assert_eq!(RecurrenceRule::parse("m 32"), Err(RepeatError::InvalidMonthlyDay));
        assert_eq!(RecurrenceRule::parse("m -3"), Err(RepeatError::InvalidMonthlyDay));
        assert_eq!(RecurrenceRule::parse("m 1,x"), Err(RepeatError::InvalidMonthlyDay));
        assert_eq!(RecurrenceRule::parse("m 1 13"), Err(RepeatError::InvalidMonth));
        assert_eq!(RecurrenceRule::parse("m 1 0"), Err(RepeatError::InvalidMonth));
        assert_eq!(RecurrenceRule::parse("m"), Err(RepeatError::UnsupportedRule));
        assert_eq!(RecurrenceRule::parse("m 1 2 3"), Err(RepeatError::UnsupportedRule));
    }

    #[test]
    fn test_parse_unknown_letter() {
        assert_eq!(RecurrenceRule::parse("x 1"), Err(RepeatError::UnsupportedRule));
        assert_eq!(RecurrenceRule::parse("Y"), Err(RepeatError::UnsupportedRule));
        assert_eq!(RecurrenceRule::parse(" y"), Err(RepeatError::UnsupportedRule));
    }

    #[test]
    fn test_display_reparses_to_same_rule() {
        let rules = vec![
            RecurrenceRule::Yearly,
            RecurrenceRule::every_n_days(1).unwrap(),
            RecurrenceRule::every_n_days(400).unwrap(),
            RecurrenceRule::weekly(vec![3, 1, 1, 7]).unwrap(),
            RecurrenceRule::monthly(vec![-1, 31, -2, 4], None).unwrap(),
            RecurrenceRule::monthly(vec![15], Some(vec![11, 2])).unwrap(),
            RecurrenceRule::monthly(vec![1], Some((1..=12).collect())).unwrap(),
        ];

        for rule in rules {
            let text = rule.to_string();
            assert_eq!(RecurrenceRule::parse(&text), Ok(rule), "round trip of {:?}", text);
        }
    }

    #[test]
    fn test_display_format() {
        assert_eq!(RecurrenceRule::parse("m -1,5 8,2").unwrap().to_string(), "m 5,-1 2,8");
        assert_eq!(RecurrenceRule::parse("m 5 1,2,3,4,5,6,7,8,9,10,11,12").unwrap().to_string(), "m 5");
        assert_eq!(RecurrenceRule::parse("w 5,1").unwrap().to_string(), "w 5,1");
    }
}
