//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::state::JobKey;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
///
/// Any of these is fatal for a run: without a reliable checkpoint, resuming
/// cannot be trusted.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to replace checkpoint file: {0}")]
    Persist(String),

    #[error("Corrupt checkpoint: {0}")]
    Corrupt(String),

    #[error("Checkpoint lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The logical shape of a checkpoint: `keyword -> engine -> nextIndex`
pub type CheckpointSnapshot = BTreeMap<String, BTreeMap<String, u64>>;

/// Trait for checkpoint backends
///
/// A store owns the persisted per-job cursors and is their only writer. A
/// missing entry means the job starts at index zero.
pub trait ProgressStore: Send {
    /// Reads the resume cursor for a job
    ///
    /// # Returns
    ///
    /// * `Ok(Some(n))` - The job resumes at generated index `n`
    /// * `Ok(None)` - No cursor recorded; start from zero
    fn load(&self, job: &JobKey) -> StorageResult<Option<u64>>;

    /// Persists the resume cursor for a job, replacing any previous value
    fn save(&mut self, job: &JobKey, next_index: u64) -> StorageResult<()>;

    /// Removes the whole checkpoint once every job of a run completed
    fn delete_all(&mut self) -> StorageResult<()>;

    /// Returns every recorded cursor
    fn snapshot(&self) -> StorageResult<CheckpointSnapshot>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for Box<T> {
    fn load(&self, job: &JobKey) -> StorageResult<Option<u64>> {
        (**self).load(job)
    }

    fn save(&mut self, job: &JobKey, next_index: u64) -> StorageResult<()> {
        (**self).save(job, next_index)
    }

    fn delete_all(&mut self) -> StorageResult<()> {
        (**self).delete_all()
    }

    fn snapshot(&self) -> StorageResult<CheckpointSnapshot> {
        (**self).snapshot()
    }
}

/// Inserts a cursor into a snapshot
pub(crate) fn snapshot_insert(snapshot: &mut CheckpointSnapshot, job: &JobKey, next_index: u64) {
    snapshot
        .entry(job.keyword.clone())
        .or_default()
        .insert(job.engine.clone(), next_index);
}
