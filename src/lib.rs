#![doc(test(attr(deny(warnings))))]

//! Expense Core offers the ledger, query, and codec primitives behind a
//! personal expense tracker: transaction CRUD with full-ledger persistence,
//! month-scoped budgets, filter/search/sort statistics, recurrence expansion,
//! and CSV/JSON interchange.

pub mod cli;
pub mod codec;
pub mod errors;
pub mod ledger;
pub mod query;
pub mod recurrence;
pub mod store;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("expense_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}
