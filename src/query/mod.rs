//! Pure query pipeline over a ledger: month selection, category and search
//! filters, stable sorting, and the derived statistics that drive the table,
//! budget banner, and charts.
//!
//! Budget accounting is month-scoped: totals, count, budget remaining, and
//! average daily spend come from the month-only set regardless of the active
//! category/search filters. Display statistics (rows, biggest expense, top
//! tag, category breakdown, trend) come from the fully filtered set.

use chrono::{Duration, NaiveDate};

use crate::ledger::{Ledger, MonthKey, Transaction};

/// Days covered by the trailing spend trend, ending today.
pub const TREND_DAYS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Leaves insertion order untouched.
    #[default]
    Unsorted,
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl SortMode {
    /// Lenient parse of the UI sort selector; unrecognized modes sort nothing.
    pub fn parse(raw: &str) -> SortMode {
        match raw.trim() {
            "date_desc" => SortMode::DateDesc,
            "date_asc" => SortMode::DateAsc,
            "amount_desc" => SortMode::AmountDesc,
            "amount_asc" => SortMode::AmountAsc,
            _ => SortMode::Unsorted,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryParams {
    pub month: MonthKey,
    /// `None` means all categories.
    pub category: Option<String>,
    pub search: String,
    pub sort: SortMode,
    /// Anchor for the trailing trend; injected so the pipeline stays pure.
    pub today: NaiveDate,
}

impl QueryParams {
    pub fn for_month(month: MonthKey, today: NaiveDate) -> QueryParams {
        QueryParams {
            month,
            category: None,
            search: String::new(),
            sort: SortMode::default(),
            today,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub limit: f64,
    pub remaining: f64,
    pub over: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySum {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPoint {
    pub day: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Display set: month + category + search filtered, sorted.
    pub rows: Vec<Transaction>,
    /// Total spend over the month-only set.
    pub month_total: f64,
    /// Transaction count over the month-only set.
    pub month_count: usize,
    /// Present only when a positive budget is set for the month.
    pub budget: Option<BudgetStatus>,
    /// Month total divided by the calendar day count of the month.
    pub average_daily: f64,
    /// Largest display-set transaction; first encountered wins ties.
    pub biggest_expense: Option<Transaction>,
    /// Most frequent non-empty display-set tag; ties go to the tag seen first.
    pub top_tag: Option<String>,
    /// Category to summed amount, in order of first appearance.
    pub category_breakdown: Vec<CategorySum>,
    /// Exactly `TREND_DAYS` daily sums ending at `today`, zeros included.
    pub trend: Vec<DayPoint>,
}

/// Runs the full pipeline. Pure: same ledger and params, same result.
pub fn run(ledger: &Ledger, params: &QueryParams) -> QueryResult {
    let month_set: Vec<&Transaction> = ledger.month_transactions(params.month).collect();
    let month_total: f64 = month_set.iter().map(|tx| tx.amount).sum();
    let month_count = month_set.len();

    let needle = params.search.trim().to_lowercase();
    let display: Vec<&Transaction> = month_set
        .iter()
        .copied()
        .filter(|tx| matches_category(tx, params.category.as_deref()))
        .filter(|tx| matches_search(tx, &needle))
        .collect();

    let budget = ledger
        .budget_for(params.month)
        .filter(|limit| *limit > 0.0)
        .map(|limit| BudgetStatus {
            limit,
            remaining: limit - month_total,
            over: month_total > limit,
        });

    let average_daily = month_total / f64::from(params.month.day_count());
    let biggest_expense = biggest_of(&display).cloned();
    let top_tag = top_tag_of(&display);
    let category_breakdown = breakdown_of(&display);
    let trend = trend_of(&display, params.today);

    let mut rows: Vec<Transaction> = display.into_iter().cloned().collect();
    sort_rows(&mut rows, params.sort);

    QueryResult {
        rows,
        month_total,
        month_count,
        budget,
        average_daily,
        biggest_expense,
        top_tag,
        category_breakdown,
        trend,
    }
}

fn matches_category(tx: &Transaction, filter: Option<&str>) -> bool {
    match filter {
        Some(category) => tx.category == category,
        None => true,
    }
}

fn matches_search(tx: &Transaction, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    tx.description.to_lowercase().contains(needle)
        || tx.tag.to_lowercase().contains(needle)
        || tx.amount.to_string().contains(needle)
}

fn sort_rows(rows: &mut [Transaction], mode: SortMode) {
    // Vec::sort_by is stable, so equal keys keep their relative order.
    match mode {
        SortMode::Unsorted => {}
        SortMode::DateDesc => rows.sort_by(|a, b| b.date.cmp(&a.date)),
        SortMode::DateAsc => rows.sort_by(|a, b| a.date.cmp(&b.date)),
        SortMode::AmountDesc => rows.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        SortMode::AmountAsc => rows.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
    }
}

fn biggest_of<'a>(display: &[&'a Transaction]) -> Option<&'a Transaction> {
    let mut biggest: Option<&'a Transaction> = None;
    for &tx in display {
        match biggest {
            Some(current) if tx.amount <= current.amount => {}
            _ => biggest = Some(tx),
        }
    }
    biggest
}

fn top_tag_of(display: &[&Transaction]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for tx in display {
        if tx.tag.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(tag, _)| *tag == tx.tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((tx.tag.as_str(), 1)),
        }
    }
    // Strictly-greater comparison keeps the first-inserted tag on ties.
    let mut top: Option<(&str, usize)> = None;
    for (tag, count) in counts {
        match top {
            Some((_, best)) if count <= best => {}
            _ => top = Some((tag, count)),
        }
    }
    top.map(|(tag, _)| tag.to_string())
}

fn breakdown_of(display: &[&Transaction]) -> Vec<CategorySum> {
    let mut sums: Vec<CategorySum> = Vec::new();
    for tx in display {
        match sums.iter_mut().find(|entry| entry.category == tx.category) {
            Some(entry) => entry.total += tx.amount,
            None => sums.push(CategorySum {
                category: tx.category.clone(),
                total: tx.amount,
            }),
        }
    }
    sums
}

fn trend_of(display: &[&Transaction], today: NaiveDate) -> Vec<DayPoint> {
    (0..TREND_DAYS as i64)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let total = display
                .iter()
                .filter(|tx| tx.date == day)
                .map(|tx| tx.amount)
                .sum();
            DayPoint { day, total }
        })
        .collect()
}
