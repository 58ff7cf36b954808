//! Ledger domain models, persistence-friendly types, and helpers.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod month;
pub mod settings;
pub mod transaction;

pub use ledger::Ledger;
pub use month::{MonthKey, ParseMonthKeyError};
pub use settings::{Settings, Theme};
pub use transaction::{
    coerce_amount, new_id, parse_amount, Repeat, Transaction, TransactionDraft, TransactionPatch,
};
