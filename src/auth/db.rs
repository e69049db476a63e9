//! Session persistence: create, validate, delete, expire.

use chrono::{Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};

use crate::config;

/// Create a session for the given user, valid for `duration_hours`
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        r#"
        INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at)
        VALUES (?1, ?2, ?3, ?4, ?3)
        "#,
        params![session_id, user_id, now.to_rfc3339(), expires.to_rfc3339()],
    )?;
    Ok(())
}

/// Resolve a session token to its user id, touching last access.
/// Expired sessions resolve to None. Occasionally sweeps expired rows.
pub fn get_session_user(conn: &Connection, session_id: &str) -> Result<Option<i64>> {
    // Opportunistic cleanup (~10% of accesses)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
        cleanup_expired_sessions(conn)?;
    }

    let now = Utc::now().to_rfc3339();
    let user_id = conn
        .query_row(
            "SELECT user_id FROM sessions WHERE id = ?1 AND expires_at > ?2",
            params![session_id, now],
            |row| row.get(0),
        )
        .optional()?;

    if user_id.is_some() {
        conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
            params![now, session_id],
        )?;
    }
    Ok(user_id)
}

pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![Utc::now().to_rfc3339()],
    )?;
    if removed > 0 {
        tracing::debug!("Removed {} expired sessions", removed);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use crate::testing::TestEnv;

    #[test]
    fn valid_session_resolves_to_user() {
        let env = TestEnv::new().unwrap();
        let user = create_user(&env.conn, "tess", "tess@example.com", "hash").unwrap();

        create_session(&env.conn, user, "tok123", 1).unwrap();
        assert_eq!(get_session_user(&env.conn, "tok123").unwrap(), Some(user));
        assert_eq!(get_session_user(&env.conn, "missing").unwrap(), None);
    }

    #[test]
    fn expired_session_does_not_resolve() {
        let env = TestEnv::new().unwrap();
        let user = create_user(&env.conn, "uma", "uma@example.com", "hash").unwrap();

        create_session(&env.conn, user, "old", -1).unwrap();
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
        assert_eq!(get_session_user(&env.conn, "old").unwrap(), None);
    }

    #[test]
    fn logout_deletes_session() {
        let env = TestEnv::new().unwrap();
        let user = create_user(&env.conn, "vik", "vik@example.com", "hash").unwrap();

        create_session(&env.conn, user, "tok", 1).unwrap();
        delete_session(&env.conn, "tok").unwrap();
        assert_eq!(get_session_user(&env.conn, "tok").unwrap(), None);
    }
}
