//! In-memory checkpoint backend
//!
//! Clones share the same cursors, so a caller can hand one clone to a
//! coordinator and inspect the other afterwards.

use crate::state::JobKey;
use crate::storage::traits::{
    snapshot_insert, CheckpointSnapshot, ProgressStore, StorageError,
    StorageResult,
};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    cursors: Arc<Mutex<CheckpointSnapshot>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with cursors
    pub fn with_snapshot(snapshot: CheckpointSnapshot) -> Self {
        Self {
            cursors: Arc::new(Mutex::new(snapshot)),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, CheckpointSnapshot>> {
        self.cursors.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, job: &JobKey) -> StorageResult<Option<u64>> {
        Ok(self
            .lock()?
            .get(&job.keyword)
            .and_then(|engines| engines.get(&job.engine))
            .copied())
    }

    fn save(&mut self, job: &JobKey, next_index: u64) -> StorageResult<()> {
        snapshot_insert(&mut *self.lock()?, job, next_index);
        Ok(())
    }

    fn delete_all(&mut self) -> StorageResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn snapshot(&self) -> StorageResult<CheckpointSnapshot> {
        Ok(self.lock()?.clone())
    }
}
