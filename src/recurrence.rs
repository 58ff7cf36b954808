//! Expands a repeating transaction into a bounded run of future occurrences.

use chrono::{Datelike, Duration, NaiveDate};

use crate::ledger::{new_id, Repeat, Transaction};

/// Number of future occurrences generated per repeating transaction.
pub const DEFAULT_OCCURRENCES: usize = 3;

/// Generates `occurrences` copies of the base transaction, each with a fresh
/// id and a date advanced cumulatively by the repeat interval. `Repeat::None`
/// yields nothing. The base transaction itself is not included.
pub fn expand(base: &Transaction, occurrences: usize) -> Vec<Transaction> {
    if base.repeat == Repeat::None {
        return Vec::new();
    }
    let mut generated = Vec::with_capacity(occurrences);
    let mut date = base.date;
    for _ in 0..occurrences {
        date = next_date(date, base.repeat);
        let mut occurrence = base.clone();
        occurrence.id = new_id();
        occurrence.date = date;
        generated.push(occurrence);
    }
    generated
}

fn next_date(from: NaiveDate, repeat: Repeat) -> NaiveDate {
    match repeat {
        Repeat::None => from,
        Repeat::Daily => from + Duration::days(1),
        Repeat::Weekly => from + Duration::weeks(1),
        Repeat::Monthly => shift_month(from, 1),
    }
}

// Month arithmetic clamps to the end of shorter months (Jan 31 -> Feb 29).
fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
