//! Interchange codecs: CSV export/import for transaction sets and the JSON
//! snapshot used for whole-ledger backup/restore.

pub mod backup;
pub mod csv;
