//! Whole-ledger JSON snapshot, offered to the user as a downloadable backup
//! and accepted back for a wholesale restore.

use crate::errors::ExpenseError;
use crate::ledger::Ledger;

/// Suggested filename for a backup artifact.
pub const BACKUP_FILE_NAME: &str = "expense-backup.json";

/// Pretty-printed snapshot of the full ledger.
pub fn to_json(ledger: &Ledger) -> Result<String, ExpenseError> {
    Ok(serde_json::to_string_pretty(ledger)?)
}

/// Parses a snapshot back into a ledger, normalizing missing sub-fields to
/// their defaults. Malformed input is a `BackupParse` error so callers can
/// surface it without touching their current state.
pub fn from_json(text: &str) -> Result<Ledger, ExpenseError> {
    serde_json::from_str(text).map_err(|err| ExpenseError::BackupParse(err.to_string()))
}
