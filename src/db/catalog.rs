//! Language/lesson/exercise catalog queries.
//!
//! The catalog is read-mostly reference data; lessons are listed in
//! (level rank, order) sequence. Option and answer lists are stored as JSON
//! text columns.

use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use crate::db::LogOnError;
use crate::domain::{Exercise, Language, Lesson, Level};

/// SQL fragment ranking levels for ordering
const LEVEL_RANK: &str =
    "CASE level WHEN 'BEGINNER' THEN 0 WHEN 'INTERMEDIATE' THEN 1 \
     WHEN 'ADVANCED' THEN 2 WHEN 'EXPERT' THEN 3 ELSE 4 END";

// ==================== Languages ====================

pub fn insert_language(
    conn: &Connection,
    name: &str,
    display_name: &str,
    icon_url: Option<&str>,
    description: Option<&str>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO languages (name, display_name, icon_url, description)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![name, display_name, icon_url, description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_languages(conn: &Connection) -> Result<Vec<Language>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, display_name, icon_url, description FROM languages ORDER BY name",
    )?;
    let languages = stmt
        .query_map([], row_to_language)?
        .collect::<Result<Vec<_>>>()?;
    Ok(languages)
}

pub fn get_language(conn: &Connection, id: i64) -> Result<Option<Language>> {
    conn.query_row(
        "SELECT id, name, display_name, icon_url, description FROM languages WHERE id = ?1",
        params![id],
        row_to_language,
    )
    .optional()
}

fn row_to_language(row: &Row<'_>) -> Result<Language> {
    Ok(Language {
        id: row.get(0)?,
        name: row.get(1)?,
        display_name: row.get(2)?,
        icon_url: row.get(3)?,
        description: row.get(4)?,
    })
}

// ==================== Lessons ====================

pub fn insert_lesson(
    conn: &Connection,
    title: &str,
    description: Option<&str>,
    language_id: i64,
    level: Level,
    order: i64,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO lessons (title, description, language_id, level, ord, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            title,
            description,
            language_id,
            level.as_str(),
            order,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_exercise(
    conn: &Connection,
    lesson_id: i64,
    position: i64,
    kind: &str,
    question: &str,
    options: &[String],
    correct_answers: &[String],
    explanation: Option<&str>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO exercises (lesson_id, position, kind, question, options, correct_answers, explanation)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            lesson_id,
            position,
            kind,
            question,
            serde_json::to_string(options).unwrap_or_else(|_| "[]".to_string()),
            serde_json::to_string(correct_answers).unwrap_or_else(|_| "[]".to_string()),
            explanation,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lessons for a language ordered by (level rank, order), exercises attached
pub fn lessons_by_language(conn: &Connection, language_id: i64) -> Result<Vec<Lesson>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT id, title, description, language_id, level, ord
        FROM lessons WHERE language_id = ?1
        ORDER BY {LEVEL_RANK}, ord
        "#
    ))?;

    let mut lessons = stmt
        .query_map(params![language_id], row_to_lesson)?
        .collect::<Result<Vec<_>>>()?;

    for lesson in &mut lessons {
        lesson.exercises = exercises_for_lesson(conn, lesson.id)?;
    }
    Ok(lessons)
}

pub fn get_lesson(conn: &Connection, id: i64) -> Result<Option<Lesson>> {
    let lesson = conn
        .query_row(
            r#"
            SELECT id, title, description, language_id, level, ord
            FROM lessons WHERE id = ?1
            "#,
            params![id],
            row_to_lesson,
        )
        .optional()?;

    match lesson {
        Some(mut lesson) => {
            lesson.exercises = exercises_for_lesson(conn, lesson.id)?;
            Ok(Some(lesson))
        }
        None => Ok(None),
    }
}

fn row_to_lesson(row: &Row<'_>) -> Result<Lesson> {
    let level: String = row.get(4)?;
    Ok(Lesson {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        language_id: row.get(3)?,
        // Unknown levels sort last in SQL; default to Beginner in the DTO
        level: Level::from_str(&level).unwrap_or(Level::Beginner),
        order: row.get(5)?,
        exercises: Vec::new(),
    })
}

// ==================== Exercises ====================

pub fn exercises_for_lesson(conn: &Connection, lesson_id: i64) -> Result<Vec<Exercise>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, lesson_id, position, kind, question, options, correct_answers, explanation
        FROM exercises WHERE lesson_id = ?1 ORDER BY position
        "#,
    )?;
    let exercises = stmt
        .query_map(params![lesson_id], row_to_exercise)?
        .collect::<Result<Vec<_>>>()?;
    Ok(exercises)
}

pub fn get_exercise(conn: &Connection, id: i64) -> Result<Option<Exercise>> {
    conn.query_row(
        r#"
        SELECT id, lesson_id, position, kind, question, options, correct_answers, explanation
        FROM exercises WHERE id = ?1
        "#,
        params![id],
        row_to_exercise,
    )
    .optional()
}

/// One uniformly random exercise for a language, optionally level-filtered
pub fn random_exercise(
    conn: &Connection,
    language_id: i64,
    level: Option<Level>,
) -> Result<Option<Exercise>> {
    let mut picked = random_exercises(conn, language_id, level, 1)?;
    Ok(picked.pop())
}

/// Up to `limit` random exercises for quiz batches
pub fn random_exercises(
    conn: &Connection,
    language_id: i64,
    level: Option<Level>,
    limit: i64,
) -> Result<Vec<Exercise>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT e.id, e.lesson_id, e.position, e.kind, e.question, e.options,
               e.correct_answers, e.explanation
        FROM exercises e
        JOIN lessons l ON l.id = e.lesson_id
        WHERE l.language_id = ?1 AND (?2 IS NULL OR l.level = ?2)
        ORDER BY RANDOM() LIMIT ?3
        "#,
    )?;
    let exercises = stmt
        .query_map(
            params![language_id, level.map(|l| l.as_str()), limit],
            row_to_exercise,
        )?
        .collect::<Result<Vec<_>>>()?;
    Ok(exercises)
}

/// Deterministic pick for the daily question: every client sees the same
/// exercise for a given (language, calendar day) pair.
pub fn daily_exercise(
    conn: &Connection,
    language_id: i64,
    today: NaiveDate,
) -> Result<Option<Exercise>> {
    let count: i64 = conn.query_row(
        r#"
        SELECT COUNT(*) FROM exercises e
        JOIN lessons l ON l.id = e.lesson_id
        WHERE l.language_id = ?1
        "#,
        params![language_id],
        |row| row.get(0),
    )?;
    if count == 0 {
        return Ok(None);
    }

    let offset = (today.num_days_from_ce() as i64).rem_euclid(count);
    conn.query_row(
        r#"
        SELECT e.id, e.lesson_id, e.position, e.kind, e.question, e.options,
               e.correct_answers, e.explanation
        FROM exercises e
        JOIN lessons l ON l.id = e.lesson_id
        WHERE l.language_id = ?1
        ORDER BY e.id LIMIT 1 OFFSET ?2
        "#,
        params![language_id, offset],
        row_to_exercise,
    )
    .optional()
}

fn row_to_exercise(row: &Row<'_>) -> Result<Exercise> {
    let options: String = row.get(5)?;
    let correct_answers: String = row.get(6)?;
    Ok(Exercise {
        id: row.get(0)?,
        lesson_id: row.get(1)?,
        position: row.get(2)?,
        kind: row.get(3)?,
        question: row.get(4)?,
        options: serde_json::from_str(&options).log_warn_default("decode exercise options"),
        correct_answers: serde_json::from_str(&correct_answers)
            .log_warn_default("decode exercise answers"),
        explanation: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    fn seed_language(conn: &Connection) -> i64 {
        insert_language(conn, "spanish", "Spanish", None, None).unwrap()
    }

    #[test]
    fn lessons_come_back_level_then_order_sorted() {
        let env = TestEnv::new().unwrap();
        let lang = seed_language(&env.conn);

        insert_lesson(&env.conn, "Advanced talk", None, lang, Level::Advanced, 0).unwrap();
        insert_lesson(&env.conn, "Basics 2", None, lang, Level::Beginner, 1).unwrap();
        insert_lesson(&env.conn, "Basics 1", None, lang, Level::Beginner, 0).unwrap();

        let titles: Vec<String> = lessons_by_language(&env.conn, lang)
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, vec!["Basics 1", "Basics 2", "Advanced talk"]);
    }

    #[test]
    fn exercise_lists_round_trip_through_json_columns() {
        let env = TestEnv::new().unwrap();
        let lang = seed_language(&env.conn);
        let lesson = insert_lesson(&env.conn, "Basics", None, lang, Level::Beginner, 0).unwrap();
        let id = insert_exercise(
            &env.conn,
            lesson,
            0,
            "multipleChoice",
            "Capital of France?",
            &["Paris".to_string(), "Lyon".to_string()],
            &["Paris".to_string()],
            Some("Paris is the capital."),
        )
        .unwrap();

        let ex = get_exercise(&env.conn, id).unwrap().unwrap();
        assert_eq!(ex.options, vec!["Paris", "Lyon"]);
        assert_eq!(ex.correct_answers, vec!["Paris"]);
        assert_eq!(ex.explanation.as_deref(), Some("Paris is the capital."));
    }

    #[test]
    fn daily_pick_is_stable_within_a_day_and_moves_across_days() {
        let env = TestEnv::new().unwrap();
        let lang = seed_language(&env.conn);
        let lesson = insert_lesson(&env.conn, "Basics", None, lang, Level::Beginner, 0).unwrap();
        for i in 0..3 {
            insert_exercise(
                &env.conn,
                lesson,
                i,
                "text",
                &format!("Q{i}"),
                &[],
                &["a".to_string()],
                None,
            )
            .unwrap();
        }

        let day1 = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

        let a = daily_exercise(&env.conn, lang, day1).unwrap().unwrap();
        let b = daily_exercise(&env.conn, lang, day1).unwrap().unwrap();
        let c = daily_exercise(&env.conn, lang, day2).unwrap().unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn random_batch_respects_level_filter_and_limit() {
        let env = TestEnv::new().unwrap();
        let lang = seed_language(&env.conn);
        let beginner = insert_lesson(&env.conn, "B", None, lang, Level::Beginner, 0).unwrap();
        let expert = insert_lesson(&env.conn, "E", None, lang, Level::Expert, 0).unwrap();
        for i in 0..4 {
            insert_exercise(&env.conn, beginner, i, "text", "q", &[], &["a".into()], None).unwrap();
        }
        insert_exercise(&env.conn, expert, 0, "text", "q", &[], &["a".into()], None).unwrap();

        let picked = random_exercises(&env.conn, lang, Some(Level::Beginner), 3).unwrap();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|e| e.lesson_id == beginner));

        let all = random_exercises(&env.conn, lang, None, 10).unwrap();
        assert_eq!(all.len(), 5);
    }
}
