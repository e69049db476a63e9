//! Per-language progress persistence.
//!
//! The completed-lesson set uses INSERT OR IGNORE against a composite
//! primary key, so adding a lesson twice is a no-op by construction.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::config;
use crate::domain::LanguageProgress;

/// Create the progress row on first touch of a language (hearts start full)
pub fn ensure_progress(conn: &Connection, user_id: i64, language_id: i64) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR IGNORE INTO language_progress (user_id, language_id, current_hearts)
        VALUES (?1, ?2, ?3)
        "#,
        params![user_id, language_id, config::MAX_HEARTS],
    )?;
    Ok(())
}

pub fn get_progress(
    conn: &Connection,
    user_id: i64,
    language_id: i64,
) -> Result<Option<LanguageProgress>> {
    let row = conn
        .query_row(
            r#"
            SELECT language_id, last_visited_lesson_id, current_hearts
            FROM language_progress WHERE user_id = ?1 AND language_id = ?2
            "#,
            params![user_id, language_id],
            |row| {
                Ok(LanguageProgress {
                    language_id: row.get(0)?,
                    completed_lesson_ids: Vec::new(),
                    last_visited_lesson_id: row.get(1)?,
                    current_hearts: row.get(2)?,
                })
            },
        )
        .optional()?;

    match row {
        Some(mut progress) => {
            progress.completed_lesson_ids = completed_lesson_ids(conn, user_id, language_id)?;
            Ok(Some(progress))
        }
        None => Ok(None),
    }
}

/// All progress rows for a user (the profile's languageProgress association)
pub fn list_progress(conn: &Connection, user_id: i64) -> Result<Vec<LanguageProgress>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT language_id, last_visited_lesson_id, current_hearts
        FROM language_progress WHERE user_id = ?1 ORDER BY language_id
        "#,
    )?;
    let mut rows = stmt
        .query_map(params![user_id], |row| {
            Ok(LanguageProgress {
                language_id: row.get(0)?,
                completed_lesson_ids: Vec::new(),
                last_visited_lesson_id: row.get(1)?,
                current_hearts: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    for progress in &mut rows {
        progress.completed_lesson_ids =
            completed_lesson_ids(conn, user_id, progress.language_id)?;
    }
    Ok(rows)
}

pub fn set_hearts(
    conn: &Connection,
    user_id: i64,
    language_id: i64,
    hearts: i64,
) -> Result<()> {
    ensure_progress(conn, user_id, language_id)?;
    conn.execute(
        r#"
        UPDATE language_progress SET current_hearts = ?1
        WHERE user_id = ?2 AND language_id = ?3
        "#,
        params![hearts.clamp(0, config::MAX_HEARTS), user_id, language_id],
    )?;
    Ok(())
}

pub fn set_last_visited(
    conn: &Connection,
    user_id: i64,
    language_id: i64,
    lesson_id: i64,
) -> Result<()> {
    ensure_progress(conn, user_id, language_id)?;
    conn.execute(
        r#"
        UPDATE language_progress SET last_visited_lesson_id = ?1
        WHERE user_id = ?2 AND language_id = ?3
        "#,
        params![lesson_id, user_id, language_id],
    )?;
    Ok(())
}

/// Union a lesson into the completed set and mark it last-visited.
/// Set semantics: completing the same lesson twice leaves one row.
pub fn mark_lesson_completed(
    conn: &Connection,
    user_id: i64,
    language_id: i64,
    lesson_id: i64,
) -> Result<()> {
    ensure_progress(conn, user_id, language_id)?;
    conn.execute(
        r#"
        INSERT OR IGNORE INTO completed_lessons (user_id, language_id, lesson_id, completed_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![user_id, language_id, lesson_id, Utc::now().to_rfc3339()],
    )?;
    set_last_visited(conn, user_id, language_id, lesson_id)
}

pub fn is_lesson_completed(
    conn: &Connection,
    user_id: i64,
    language_id: i64,
    lesson_id: i64,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        r#"
        SELECT COUNT(*) FROM completed_lessons
        WHERE user_id = ?1 AND language_id = ?2 AND lesson_id = ?3
        "#,
        params![user_id, language_id, lesson_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn completed_lesson_ids(
    conn: &Connection,
    user_id: i64,
    language_id: i64,
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT lesson_id FROM completed_lessons
        WHERE user_id = ?1 AND language_id = ?2 ORDER BY completed_at
        "#,
    )?;
    let ids = stmt
        .query_map(params![user_id, language_id], |row| row.get(0))?
        .collect::<Result<Vec<_>>>()?;
    Ok(ids)
}
