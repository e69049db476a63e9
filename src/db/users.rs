//! User row operations.
//!
//! Score mutations go through `add_to_global_score`, a single UPDATE with an
//! in-place increment so concurrent requests cannot lose awards to a
//! read-modify-write race.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use crate::domain::{Role, User};

pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
        INSERT INTO users (username, email, password_hash, role, last_active_date, created_at)
        VALUES (?1, ?2, ?3, 'user', ?4, ?4)
        "#,
        params![username, email, password_hash, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Look up credentials by username or email (login accepts either)
pub fn get_credentials(conn: &Connection, identity: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE username = ?1 OR email = ?1",
        params![identity],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn identity_taken(conn: &Connection, username: &str, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
        params![username, email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        r#"
        SELECT id, username, email, role, global_score, daily_streak,
               selected_language_id, profile_image, last_daily_question_answered,
               last_active_date, created_at
        FROM users WHERE id = ?1
        "#,
        params![id],
        row_to_user,
    )
    .optional()
}

pub fn set_selected_language(conn: &Connection, user_id: i64, language_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE users SET selected_language_id = ?1 WHERE id = ?2",
        params![language_id, user_id],
    )?;
    Ok(changed > 0)
}

/// Update mutable profile fields; None leaves a field untouched
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    username: Option<&str>,
    profile_image: Option<&str>,
) -> Result<()> {
    if let Some(username) = username {
        conn.execute(
            "UPDATE users SET username = ?1 WHERE id = ?2",
            params![username, user_id],
        )?;
    }
    if let Some(image) = profile_image {
        conn.execute(
            "UPDATE users SET profile_image = ?1 WHERE id = ?2",
            params![image, user_id],
        )?;
    }
    Ok(())
}

/// Atomically add points to the global score and return the new total.
/// The increment happens inside the UPDATE, never in application code.
pub fn add_to_global_score(conn: &Connection, user_id: i64, points: i64) -> Result<i64> {
    conn.execute(
        "UPDATE users SET global_score = global_score + ?1 WHERE id = ?2",
        params![points, user_id],
    )?;
    conn.query_row(
        "SELECT global_score FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn set_last_daily_answered(conn: &Connection, user_id: i64, day: NaiveDate) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_daily_question_answered = ?1 WHERE id = ?2",
        params![day.format("%Y-%m-%d").to_string(), user_id],
    )?;
    Ok(())
}

pub fn touch_last_active(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_active_date = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), user_id],
    )?;
    Ok(())
}

fn row_to_user(row: &Row<'_>) -> Result<User> {
    let role: String = row.get(3)?;
    let last_daily: Option<String> = row.get(8)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: Role::from_str(&role),
        global_score: row.get(4)?,
        daily_streak: row.get(5)?,
        selected_language_id: row.get(6)?,
        profile_image: row.get(7)?,
        last_daily_question_answered: last_daily
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        last_active_date: parse_datetime(row.get::<_, String>(9)?),
        created_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn score_increment_is_cumulative_and_returns_new_total() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "mira", "mira@example.com", "hash").unwrap();

        assert_eq!(add_to_global_score(&env.conn, id, 10).unwrap(), 10);
        assert_eq!(add_to_global_score(&env.conn, id, 10).unwrap(), 20);
        assert_eq!(add_to_global_score(&env.conn, id, 0).unwrap(), 20);

        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.global_score, 20);
    }

    #[test]
    fn new_user_starts_with_empty_state() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "noor", "noor@example.com", "hash").unwrap();
        let user = get_user(&env.conn, id).unwrap().unwrap();

        assert_eq!(user.global_score, 0);
        assert_eq!(user.daily_streak, 0);
        assert!(user.selected_language_id.is_none());
        assert!(user.last_daily_question_answered.is_none());
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn identity_checks_cover_username_and_email() {
        let env = TestEnv::new().unwrap();
        create_user(&env.conn, "sam", "sam@example.com", "hash").unwrap();

        assert!(identity_taken(&env.conn, "sam", "other@example.com").unwrap());
        assert!(identity_taken(&env.conn, "other", "sam@example.com").unwrap());
        assert!(!identity_taken(&env.conn, "other", "other@example.com").unwrap());

        assert!(get_credentials(&env.conn, "sam").unwrap().is_some());
        assert!(get_credentials(&env.conn, "sam@example.com").unwrap().is_some());
        assert!(get_credentials(&env.conn, "ghost").unwrap().is_none());
    }

    #[test]
    fn daily_answered_round_trips_as_date() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "kai", "kai@example.com", "hash").unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

        set_last_daily_answered(&env.conn, id, day).unwrap();
        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.last_daily_question_answered, Some(day));
    }
}
