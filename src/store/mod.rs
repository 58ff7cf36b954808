//! Persistence: an opaque single-key blob store plus the session that owns
//! the in-memory ledger and re-persists the whole of it after every mutation.

mod file;
mod session;

pub use file::FileStore;
pub use session::Session;

use crate::errors::ExpenseError;

pub type Result<T> = std::result::Result<T, ExpenseError>;

/// Single-key blob storage boundary. The ledger is serialized in full and
/// written back as one document; prior content is unrecoverable after a
/// write.
pub trait BlobStore {
    /// Returns the stored blob, or `None` when nothing was persisted yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, blob: &str) -> Result<()>;
}

/// In-memory store used in tests and anywhere a host process supplies its
/// own key-value substrate.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> MemoryStore {
        MemoryStore {
            blob: Some(blob.into()),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl BlobStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        self.blob = Some(blob.to_string());
        Ok(())
    }
}
