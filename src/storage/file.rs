//! File-based storage backend.

use crate::error::Result;
use crate::storage::traits::{SessionLog, SessionRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the log file inside the storage directory.
pub const LOG_FILE_NAME: &str = "buffer_sequences.json";

/// Single JSON document holding the whole session log.
///
/// Writes overwrite the file in place; a crash mid-write can leave a
/// truncated document behind.
#[derive(Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a new file backend.
    ///
    /// Creates the storage directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Path to the log document.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join(LOG_FILE_NAME)
    }

    /// Storage directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl SessionLog for FileBackend {
    fn load(&self) -> Result<Vec<SessionRecord>> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        let records = serde_json::from_str(&contents)?;
        Ok(records)
    }

    fn save(&self, records: &[SessionRecord]) -> Result<()> {
        let contents = serde_json::to_string_pretty(records)?;
        fs::write(self.log_path(), contents)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.log_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
