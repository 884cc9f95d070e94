//! SQLite checkpoint backend
//!
//! This module provides a SQLite-based implementation of the ProgressStore
//! trait. Each save is a single UPSERT, so the database is always consistent
//! between units.

use crate::state::JobKey;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    snapshot_insert, CheckpointSnapshot, ProgressStore, StorageResult,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

/// SQLite checkpoint backend
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    /// Opens or creates the checkpoint database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteProgressStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
        ",
        )?;

        initialize_schema(&conn)?;
        info!("Opened checkpoint database {}", path.display());

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl ProgressStore for SqliteProgressStore {
    fn load(&self, job: &JobKey) -> StorageResult<Option<u64>> {
        let next: Option<i64> = self
            .conn
            .query_row(
                "SELECT next_index FROM cursors WHERE keyword = ?1 AND engine = ?2",
                params![job.keyword, job.engine],
                |row| row.get(0),
            )
            .optional()?;

        Ok(next.map(|n| n.max(0) as u64))
    }

    fn save(&mut self, job: &JobKey, next_index: u64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO cursors (keyword, engine, next_index, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(keyword, engine) DO UPDATE SET
                next_index = excluded.next_index,
                updated_at = excluded.updated_at",
            params![job.keyword, job.engine, next_index as i64, now],
        )?;
        debug!("Cursor {} -> {}", job, next_index);
        Ok(())
    }

    fn delete_all(&mut self) -> StorageResult<()> {
        let removed = self.conn.execute("DELETE FROM cursors", [])?;
        info!("Removed {} checkpoint cursor(s)", removed);
        Ok(())
    }

    fn snapshot(&self) -> StorageResult<CheckpointSnapshot> {
        let mut stmt = self
            .conn
            .prepare("SELECT keyword, engine, next_index FROM cursors ORDER BY keyword, engine")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut snapshot = CheckpointSnapshot::new();
        for row in rows {
            let (keyword, engine, next) = row?;
            snapshot_insert(&mut snapshot, &JobKey::new(keyword, engine), next.max(0) as u64);
        }

        Ok(snapshot)
    }
}
