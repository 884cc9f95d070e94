//! Database schema definitions for the SQLite checkpoint backend

/// SQL schema for the checkpoint database
pub const SCHEMA_SQL: &str = r#"
-- One resume cursor per (keyword, engine) job
CREATE TABLE IF NOT EXISTS cursors (
    keyword TEXT NOT NULL,
    engine TEXT NOT NULL,
    next_index INTEGER NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (keyword, engine)
);

CREATE TABLE IF NOT EXISTS schema_meta (
    version INTEGER NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;

    let recorded: i64 = conn.query_row("SELECT COUNT(*) FROM schema_meta", [], |row| row.get(0))?;
    if recorded == 0 {
        conn.execute(
            "INSERT INTO schema_meta (version) VALUES (?1)",
            [get_schema_version()],
        )?;
    }

    Ok(())
}

/// Gets the current schema version
pub fn get_schema_version() -> u32 {
    1
}
