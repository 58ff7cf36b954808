use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    month::MonthKey,
    settings::Settings,
    transaction::{coerce_amount, new_id, Transaction, TransactionDraft, TransactionPatch},
};

/// Aggregate root owning all transactions, the per-month budget map, and the
/// settings. Every field defaults so a partial persisted blob normalizes on
/// load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budget: BTreeMap<MonthKey, f64>,
    #[serde(default)]
    pub settings: Settings,
}

impl Ledger {
    /// Starter ledger seeded on first run.
    pub fn sample(today: NaiveDate) -> Ledger {
        let mut ledger = Ledger::default();
        ledger.add_transaction(
            TransactionDraft {
                description: "Sample: Coffee".into(),
                amount: 45.0,
                category: "Food".into(),
                payment: "Cash".into(),
                tag: "sample".into(),
                ..TransactionDraft::default()
            }
            .materialize(today),
        );
        ledger.add_transaction(
            TransactionDraft {
                description: "Sample: Grocery".into(),
                amount: 350.0,
                category: "Groceries".into(),
                payment: "Card".into(),
                tag: "sample".into(),
                ..TransactionDraft::default()
            }
            .materialize(today),
        );
        ledger
    }

    /// Appends a transaction, regenerating the id on collision so ids stay
    /// unique within the sequence. Returns the stored transaction.
    pub fn add_transaction(&mut self, mut transaction: Transaction) -> Transaction {
        while self.find(&transaction.id).is_some() {
            transaction.id = new_id();
        }
        let stored = transaction.clone();
        self.transactions.push(transaction);
        stored
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// Removes the matching transaction. Absent ids are a no-op.
    pub fn delete_transaction(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|tx| tx.id != id);
        self.transactions.len() != before
    }

    /// Merges the patch into the matching transaction. Absent ids are a no-op.
    pub fn edit_transaction(&mut self, id: &str, patch: &TransactionPatch) -> bool {
        match self.transactions.iter_mut().find(|tx| tx.id == id) {
            Some(tx) => {
                patch.apply(tx);
                true
            }
            None => false,
        }
    }

    pub fn set_budget(&mut self, month: MonthKey, amount: f64) {
        self.budget.insert(month, coerce_amount(amount));
    }

    pub fn budget_for(&self, month: MonthKey) -> Option<f64> {
        self.budget.get(&month).copied()
    }

    pub fn month_transactions(&self, month: MonthKey) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |tx| month.contains(tx.date))
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
