use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single recorded expense. Identity is the `id`; two transactions may
/// otherwise be identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub payment: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub repeat: Repeat,
}

/// Recurrence frequency attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Repeat {
    /// Lenient parse used on import paths; anything unrecognized is `None`.
    pub fn parse(raw: &str) -> Repeat {
        match raw.trim().to_lowercase().as_str() {
            "daily" => Repeat::Daily,
            "weekly" => Repeat::Weekly,
            "monthly" => Repeat::Monthly,
            _ => Repeat::None,
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Repeat::None => "none",
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
        };
        f.write_str(label)
    }
}

/// Input for creating a transaction. Missing id and date are filled in when
/// the draft is materialized.
#[derive(Debug, Clone, Default)]
pub struct TransactionDraft {
    pub id: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub payment: String,
    pub tag: String,
    pub repeat: Repeat,
}

impl TransactionDraft {
    pub fn materialize(self, today: NaiveDate) -> Transaction {
        Transaction {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_id),
            date: self.date.unwrap_or(today),
            description: self.description,
            amount: coerce_amount(self.amount),
            category: self.category,
            payment: self.payment,
            tag: self.tag,
            repeat: self.repeat,
        }
    }
}

/// Partial field overwrite applied by the edit operation.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub payment: Option<String>,
    pub tag: Option<String>,
    pub repeat: Option<Repeat>,
}

impl TransactionPatch {
    pub fn apply(&self, transaction: &mut Transaction) {
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
        if let Some(amount) = self.amount {
            transaction.amount = coerce_amount(amount);
        }
        if let Some(category) = &self.category {
            transaction.category = category.clone();
        }
        if let Some(payment) = &self.payment {
            transaction.payment = payment.clone();
        }
        if let Some(tag) = &self.tag {
            transaction.tag = tag.clone();
        }
        if let Some(repeat) = self.repeat {
            transaction.repeat = repeat;
        }
    }
}

/// Generates a fresh collision-resistant transaction id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Collapses non-finite or negative amounts to zero.
pub fn coerce_amount(raw: f64) -> f64 {
    if raw.is_finite() && raw >= 0.0 {
        raw
    } else {
        0.0
    }
}

/// Numeric coercion for free-form amount input; garbage becomes zero.
pub fn parse_amount(raw: &str) -> f64 {
    coerce_amount(raw.trim().parse().unwrap_or(0.0))
}
