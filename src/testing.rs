//! Test utilities for database setup.
//!
//! Reuses the authoritative migration functions so tests never duplicate
//! schema definitions. The starter catalog is not seeded; tests that need
//! it call `db::seed::seed_catalog` themselves.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// Test environment with a fully migrated database in a temp directory.
/// The directory is cleaned up when the environment is dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with all migrations applied
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("lingoleap.db");
        let conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Temporary directory path for creating extra test files
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}
