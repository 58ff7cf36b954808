use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `YYYY-MM` calendar month key, used to scope budgets and the primary
/// view. Membership is decided by calendar comparison rather than string
/// prefix so `2024-1` can never swallow `2024-10`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid month key `{0}`, expected YYYY-MM")]
pub struct ParseMonthKeyError(String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<MonthKey> {
        if (1..=12).contains(&month) {
            Some(MonthKey { year, month })
        } else {
            None
        }
    }

    /// The month a given date falls in.
    pub fn of(date: NaiveDate) -> MonthKey {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Number of calendar days in this month, leap years included.
    pub fn day_count(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first_next| first_next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(30)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let error = || ParseMonthKeyError(raw.to_string());
        let (year_part, month_part) = raw.trim().split_once('-').ok_or_else(error)?;
        let year: i32 = year_part.parse().map_err(|_| error())?;
        let month: u32 = month_part.parse().map_err(|_| error())?;
        MonthKey::new(year, month).ok_or_else(error)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ParseMonthKeyError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> String {
        key.to_string()
    }
}
