use chrono::{Local, NaiveDate};

use super::{BlobStore, Result};
use crate::codec::{backup, csv};
use crate::errors::ExpenseError;
use crate::ledger::{Ledger, MonthKey, Theme, Transaction, TransactionDraft, TransactionPatch};
use crate::recurrence;

/// Owns the ledger for one process and a blob store to persist it in. Every
/// mutating operation immediately re-serializes the full ledger; the only
/// batching is CSV import, which commits once after the whole file.
pub struct Session<S: BlobStore> {
    store: S,
    ledger: Ledger,
}

impl<S: BlobStore> Session<S> {
    /// Loads the persisted ledger. A missing blob seeds the sample ledger
    /// and persists it; a corrupt blob is logged and replaced in memory by
    /// an empty ledger rather than failing.
    pub fn open(store: S) -> Result<Session<S>> {
        Session::open_on(store, Local::now().date_naive())
    }

    pub fn open_on(store: S, today: NaiveDate) -> Result<Session<S>> {
        match store.read()? {
            Some(blob) => {
                let ledger = match serde_json::from_str::<Ledger>(&blob) {
                    Ok(ledger) => ledger,
                    Err(err) => {
                        tracing::warn!(%err, "persisted ledger is corrupt, starting empty");
                        Ledger::default()
                    }
                };
                Ok(Session { store, ledger })
            }
            None => {
                let mut session = Session {
                    store,
                    ledger: Ledger::sample(today),
                };
                session.persist()?;
                Ok(session)
            }
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds one transaction; id and date default when absent.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction> {
        self.add_transaction_on(draft, Local::now().date_naive())
    }

    pub fn add_transaction_on(
        &mut self,
        draft: TransactionDraft,
        today: NaiveDate,
    ) -> Result<Transaction> {
        self.add_prepared(draft.materialize(today))
    }

    /// Adds a transaction and, when it repeats, its generated future
    /// occurrences, each persisted through the same add path. Returns
    /// everything created, base first.
    pub fn add_with_recurrence(&mut self, draft: TransactionDraft) -> Result<Vec<Transaction>> {
        self.add_with_recurrence_on(draft, Local::now().date_naive())
    }

    pub fn add_with_recurrence_on(
        &mut self,
        draft: TransactionDraft,
        today: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let base = self.add_transaction_on(draft, today)?;
        let mut created = vec![base];
        let occurrences = recurrence::expand(&created[0], recurrence::DEFAULT_OCCURRENCES);
        for occurrence in occurrences {
            created.push(self.add_prepared(occurrence)?);
        }
        Ok(created)
    }

    fn add_prepared(&mut self, transaction: Transaction) -> Result<Transaction> {
        let stored = self.ledger.add_transaction(transaction);
        tracing::debug!(id = %stored.id, date = %stored.date, "transaction added");
        self.persist()?;
        Ok(stored)
    }

    /// Removes a transaction; absent ids are a silent no-op.
    pub fn delete_transaction(&mut self, id: &str) -> Result<bool> {
        let removed = self.ledger.delete_transaction(id);
        self.persist()?;
        Ok(removed)
    }

    /// Merges partial fields into a transaction; absent ids are a silent
    /// no-op and skip the persist.
    pub fn edit_transaction(&mut self, id: &str, patch: &TransactionPatch) -> Result<bool> {
        let changed = self.ledger.edit_transaction(id, patch);
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    pub fn set_budget(&mut self, month: MonthKey, amount: f64) -> Result<()> {
        self.ledger.set_budget(month, amount);
        self.persist()
    }

    /// Flips the theme and persists it. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.ledger.settings.theme = self.ledger.settings.theme.toggled();
        self.persist()?;
        Ok(self.ledger.settings.theme)
    }

    /// Replaces the ledger with an empty one. Callers must have obtained the
    /// user's confirmation before invoking this.
    pub fn reset_all(&mut self) -> Result<()> {
        self.ledger = Ledger::default();
        self.persist()
    }

    /// Parses a CSV document and appends every row, committing once after
    /// the whole file. Returns the number of imported transactions.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        self.import_csv_on(text, Local::now().date_naive())
    }

    pub fn import_csv_on(&mut self, text: &str, today: NaiveDate) -> Result<usize> {
        let parsed = csv::from_csv(text, today)?;
        let count = parsed.len();
        for transaction in parsed {
            self.ledger.add_transaction(transaction);
        }
        self.persist()?;
        tracing::debug!(count, "CSV import committed");
        Ok(count)
    }

    /// CSV for the given month's transactions.
    pub fn export_csv(&self, month: MonthKey) -> Result<String> {
        csv::to_csv(self.ledger.month_transactions(month))
    }

    /// Pretty-printed snapshot of the whole ledger.
    pub fn backup_json(&self) -> Result<String> {
        backup::to_json(&self.ledger)
    }

    /// Replaces the ledger wholesale from a backup snapshot. Malformed input
    /// leaves the current ledger untouched.
    pub fn restore_json(&mut self, text: &str) -> Result<()> {
        let ledger = backup::from_json(text)?;
        self.ledger = ledger;
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.ledger).map_err(ExpenseError::from)?;
        self.store.write(&blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Repeat;
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 3, 5)
    }

    fn empty_session() -> Session<MemoryStore> {
        // Start from an explicit empty blob so the sample data stays out of
        // the way.
        Session::open_on(MemoryStore::with_blob("{}"), today()).unwrap()
    }

    #[test]
    fn missing_blob_seeds_sample_ledger_and_persists() {
        let session = Session::open_on(MemoryStore::new(), today()).unwrap();
        assert_eq!(session.ledger().transaction_count(), 2);
        assert!(session.store().blob().is_some());
    }

    #[test]
    fn corrupt_blob_falls_back_to_empty_ledger() {
        let session = Session::open_on(MemoryStore::with_blob("{broken"), today()).unwrap();
        assert_eq!(session.ledger().transaction_count(), 0);
        // The corrupt blob stays until the next mutation overwrites it.
        assert_eq!(session.store().blob(), Some("{broken"));
    }

    #[test]
    fn load_is_idempotent_without_intervening_save() {
        let mut first = empty_session();
        first
            .add_transaction_on(
                TransactionDraft {
                    description: "Coffee".into(),
                    amount: 45.0,
                    ..TransactionDraft::default()
                },
                today(),
            )
            .unwrap();
        let blob = first.store().blob().unwrap().to_string();

        let second = Session::open_on(MemoryStore::with_blob(blob.clone()), today()).unwrap();
        let third = Session::open_on(MemoryStore::with_blob(blob), today()).unwrap();
        assert_eq!(second.ledger(), third.ledger());
    }

    #[test]
    fn every_mutation_persists() {
        let mut session = empty_session();
        let tx = session
            .add_transaction_on(
                TransactionDraft {
                    description: "Coffee".into(),
                    amount: 45.0,
                    ..TransactionDraft::default()
                },
                today(),
            )
            .unwrap();
        let after_add = session.store().blob().unwrap().to_string();
        assert!(after_add.contains("Coffee"));

        session.delete_transaction(&tx.id).unwrap();
        let after_delete = session.store().blob().unwrap().to_string();
        assert!(!after_delete.contains("Coffee"));
    }

    #[test]
    fn add_defaults_date_to_today() {
        let mut session = empty_session();
        let tx = session
            .add_transaction_on(TransactionDraft::default(), today())
            .unwrap();
        assert_eq!(tx.date, today());
    }

    #[test]
    fn recurrence_creates_three_extra_transactions() {
        let mut session = empty_session();
        let created = session
            .add_with_recurrence_on(
                TransactionDraft {
                    description: "Gym".into(),
                    amount: 30.0,
                    date: Some(date(2024, 1, 1)),
                    repeat: Repeat::Weekly,
                    ..TransactionDraft::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(created.len(), 4);
        assert_eq!(session.ledger().transaction_count(), 4);
        let dates: Vec<NaiveDate> = created.iter().skip(1).map(|t| t.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 22)]
        );
    }

    #[test]
    fn edit_missing_id_skips_persist() {
        let mut session = empty_session();
        let before = session.store().blob().map(str::to_string);
        let changed = session
            .edit_transaction("ghost", &TransactionPatch::default())
            .unwrap();
        assert!(!changed);
        assert_eq!(session.store().blob().map(str::to_string), before);
    }

    #[test]
    fn csv_import_appends_and_commits_once() {
        let mut session = empty_session();
        let csv = "id,date,description,amount,category,payment,tag,repeat\n\
                   \"a\",\"2024-03-01\",\"One\",\"10.00\",\"Food\",\"\",\"\",\"none\"\n\
                   \"b\",\"2024-03-02\",\"Two\",\"20.00\",\"Food\",\"\",\"\",\"none\"\n";
        let imported = session.import_csv_on(csv, today()).unwrap();
        assert_eq!(imported, 2);
        assert_eq!(session.ledger().transaction_count(), 2);
        let blob = session.store().blob().unwrap();
        assert!(blob.contains("One") && blob.contains("Two"));
    }

    #[test]
    fn restore_rejects_malformed_input_and_keeps_state() {
        let mut session = empty_session();
        session
            .add_transaction_on(
                TransactionDraft {
                    description: "Keep me".into(),
                    amount: 10.0,
                    ..TransactionDraft::default()
                },
                today(),
            )
            .unwrap();

        let err = session.restore_json("not json at all").unwrap_err();
        assert!(matches!(err, ExpenseError::BackupParse(_)));
        assert_eq!(session.ledger().transaction_count(), 1);
        assert_eq!(session.ledger().transactions[0].description, "Keep me");
    }

    #[test]
    fn backup_restore_round_trip() {
        let mut session = empty_session();
        session
            .add_transaction_on(
                TransactionDraft {
                    description: "Coffee".into(),
                    amount: 45.0,
                    category: "Food".into(),
                    ..TransactionDraft::default()
                },
                today(),
            )
            .unwrap();
        session
            .set_budget(MonthKey::new(2024, 3).unwrap(), 500.0)
            .unwrap();
        let snapshot = session.backup_json().unwrap();
        let original = session.ledger().clone();

        let mut other = empty_session();
        other.restore_json(&snapshot).unwrap();
        assert_eq!(other.ledger(), &original);
    }

    #[test]
    fn reset_all_replaces_with_empty_ledger() {
        let mut session = Session::open_on(MemoryStore::new(), today()).unwrap();
        session.set_budget(MonthKey::new(2024, 3).unwrap(), 100.0).unwrap();
        session.reset_all().unwrap();
        assert_eq!(session.ledger(), &Ledger::default());
        assert_eq!(session.store().blob(), Some("{\"transactions\":[],\"budget\":{},\"settings\":{\"theme\":\"light\"}}"));
    }

    #[test]
    fn theme_toggle_persists() {
        let mut session = empty_session();
        assert_eq!(session.toggle_theme().unwrap(), Theme::Dark);
        assert!(session.store().blob().unwrap().contains("\"dark\""));
        assert_eq!(session.toggle_theme().unwrap(), Theme::Light);
    }
}
