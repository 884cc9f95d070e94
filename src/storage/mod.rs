//! Storage module for persisting harvest progress
//!
//! This module owns the on-disk checkpoint: one resume cursor per
//! (keyword, engine) job. Two file backends are provided (a JSON file and a
//! SQLite database) plus an in-memory store for tests and dry runs.

mod json;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonProgressStore;
pub use memory::MemoryProgressStore;
pub use sqlite::SqliteProgressStore;
pub use traits::{CheckpointSnapshot, ProgressStore, StorageError, StorageResult};

use crate::config::CheckpointBackend;
use std::path::Path;

/// Opens the configured checkpoint backend
///
/// # Arguments
///
/// * `backend` - Which backend to use
/// * `path` - Path to the checkpoint file
///
/// # Returns
///
/// * `Ok(Box<dyn ProgressStore>)` - Opened store, empty if the file was absent
/// * `Err(StorageError)` - The checkpoint exists but could not be read
pub fn open_store(backend: CheckpointBackend, path: &Path) -> StorageResult<Box<dyn ProgressStore>> {
    Ok(match backend {
        CheckpointBackend::Json => Box::new(JsonProgressStore::open(path)?),
        CheckpointBackend::Sqlite => Box::new(SqliteProgressStore::open(path)?),
    })
}
