use std::{
    fs,
    path::{Path, PathBuf},
};

use super::{BlobStore, Result};

const LEDGER_FILE: &str = "ledger.json";
const APP_DIR: &str = "expense-core";

/// Blob store backed by a single JSON file, written atomically by staging to
/// a temporary file first.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> FileStore {
        FileStore { path }
    }

    /// Store rooted in the platform data directory.
    pub fn default_in_data_dir() -> FileStore {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        FileStore::new(base.join(APP_DIR).join(LEDGER_FILE))
    }

    /// Store rooted in an explicit directory, e.g. a `--data-dir` override.
    pub fn in_dir(dir: &Path) -> FileStore {
        FileStore::new(dir.join(LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for FileStore {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
