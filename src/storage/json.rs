//! JSON checkpoint file
//!
//! The file holds exactly the `keyword -> engine -> nextIndex` mapping:
//!
//! ```json
//! { "acme corp": { "google": 2, "bing": 1 } }
//! ```
//!
//! Every write replaces the whole file through a temporary file in the same
//! directory, so a crash mid-write leaves the previous checkpoint intact.

use crate::state::JobKey;
use crate::storage::traits::{
    snapshot_insert, CheckpointSnapshot, ProgressStore, StorageError,
    StorageResult,
};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Checkpoint backend writing a single JSON file
#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
    cursors: CheckpointSnapshot,
}

impl JsonProgressStore {
    /// Opens the checkpoint at `path`, tolerating its absence
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the checkpoint file
    ///
    /// # Returns
    ///
    /// * `Ok(JsonProgressStore)` - Loaded (or empty) checkpoint
    /// * `Err(StorageError)` - The file exists but cannot be read or parsed
    pub fn open(path: &Path) -> StorageResult<Self> {
        let cursors = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => CheckpointSnapshot::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StorageError::Corrupt(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No checkpoint at {}, starting fresh", path.display());
                CheckpointSnapshot::new()
            }
            Err(e) => return Err(e.into()),
        };

        if !cursors.is_empty() {
            info!(
                "Loaded checkpoint {} with {} keyword(s)",
                path.display(),
                cursors.len()
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            cursors,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(&self.cursors)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::Persist(e.error.to_string()))?;

        debug!("Checkpoint written to {}", self.path.display());
        Ok(())
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self, job: &JobKey) -> StorageResult<Option<u64>> {
        Ok(self
            .cursors
            .get(&job.keyword)
            .and_then(|engines| engines.get(&job.engine))
            .copied())
    }

    fn save(&mut self, job: &JobKey, next_index: u64) -> StorageResult<()> {
        snapshot_insert(&mut self.cursors, job, next_index);
        self.write_file()
    }

    fn delete_all(&mut self) -> StorageResult<()> {
        self.cursors.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Checkpoint {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn snapshot(&self) -> StorageResult<CheckpointSnapshot> {
        Ok(self.cursors.clone())
    }
}
