//! Database schema with version-gated migrations.
//!
//! Each migration:
//! 1. Checks if the current schema version is less than the target version
//! 2. Runs the migration SQL
//! 3. Records the new version in the `db_version` table
//!
//! Migrations only run once - the version check ensures idempotency. New
//! databases run all migrations in order on first open.

use chrono::Utc;
use rusqlite::{Connection, Result, params};

/// Current schema version
/// Increment this when adding a new migration
pub const DB_VERSION: i32 = 4;

/// Initialize the schema with version-gated migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Bootstrap: ensure db_version table exists (needed to check version)
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS db_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL,
            description TEXT
        );
        "#,
    )?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!("database schema version: {}", current_version);

    if current_version < 1 {
        migrate_v0_to_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v1_to_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v2_to_v3(conn)?;
    }
    if current_version < 4 {
        migrate_v3_to_v4(conn)?;
    }

    Ok(())
}

/// v0→v1: Base tables (users, sessions, catalog)
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v0→v1: Create base tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE COLLATE NOCASE,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            global_score INTEGER NOT NULL DEFAULT 0,
            daily_streak INTEGER NOT NULL DEFAULT 0,
            selected_language_id INTEGER,
            last_active_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            last_access_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS languages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            display_name TEXT NOT NULL,
            icon_url TEXT,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS lessons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            language_id INTEGER NOT NULL,
            level TEXT NOT NULL,
            ord INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY (language_id) REFERENCES languages(id)
        );

        CREATE TABLE IF NOT EXISTS exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lesson_id INTEGER NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            kind TEXT NOT NULL,
            question TEXT NOT NULL,
            options TEXT NOT NULL DEFAULT '[]',
            correct_answers TEXT NOT NULL DEFAULT '[]',
            explanation TEXT,
            FOREIGN KEY (lesson_id) REFERENCES lessons(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        CREATE INDEX IF NOT EXISTS idx_lessons_language ON lessons(language_id);
        CREATE INDEX IF NOT EXISTS idx_exercises_lesson ON exercises(lesson_id);
        "#,
    )?;

    record_version(conn, 1, "Create base tables (users, sessions, catalog)")?;
    Ok(())
}

/// v1→v2: Per-language progress and completed-lesson set
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1→v2: Add progress tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS language_progress (
            user_id INTEGER NOT NULL,
            language_id INTEGER NOT NULL,
            last_visited_lesson_id INTEGER,
            current_hearts INTEGER NOT NULL DEFAULT 3,
            PRIMARY KEY (user_id, language_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (language_id) REFERENCES languages(id)
        );

        CREATE TABLE IF NOT EXISTS completed_lessons (
            user_id INTEGER NOT NULL,
            language_id INTEGER NOT NULL,
            lesson_id INTEGER NOT NULL,
            completed_at TEXT NOT NULL,
            PRIMARY KEY (user_id, language_id, lesson_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );
        "#,
    )?;

    record_version(conn, 2, "Add progress tables (language_progress, completed_lessons)")?;
    Ok(())
}

/// v2→v3: Monthly leaderboard
fn migrate_v2_to_v3(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v2→v3: Add leaderboard");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS leaderboard_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            month_year TEXT NOT NULL,
            username TEXT NOT NULL,
            profile_image_uri TEXT,
            score INTEGER NOT NULL DEFAULT 0,
            last_updated TEXT NOT NULL,
            UNIQUE (user_id, month_year),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_leaderboard_month ON leaderboard_entries(month_year);
        "#,
    )?;

    record_version(conn, 3, "Add leaderboard_entries")?;
    Ok(())
}

/// v3→v4: Profile image and daily question gate columns
fn migrate_v3_to_v4(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v3→v4: Add profile and daily question columns");

    add_column_if_missing(conn, "users", "profile_image", "TEXT")?;
    add_column_if_missing(conn, "users", "last_daily_question_answered", "TEXT")?;

    record_version(conn, 4, "Add profile_image, last_daily_question_answered")?;
    Ok(())
}

/// Get the current schema version (0 for a fresh database)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM db_version",
        [],
        |row| row.get(0),
    )
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, Utc::now().to_rfc3339(), description],
    )?;
    Ok(())
}

/// Add a column to a table if it does not exist yet.
/// SQLite has no ADD COLUMN IF NOT EXISTS; probe the table info instead.
fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_>>()?;

    if !existing.iter().any(|c| c == column) {
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {};",
            table, column, definition
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), DB_VERSION);
        // Second run is a no-op
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), DB_VERSION);
    }
}
