//! Monthly leaderboard persistence.
//!
//! One entry per (user, month); reconciliation only ever raises the stored
//! score, so a month's entry is monotonically non-decreasing. Prior months
//! become read-only once the month rolls over (nothing writes to them).

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use crate::domain::{LeaderboardEntry, PastLeaderboard, RankedEntry, User};

/// Calendar month bucket key, e.g. "2026-08"
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Any date inside the month before `date`'s month
pub fn previous_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.pred_opt()
}

/// Fold the user's current global score into this month's entry.
///
/// Creates the entry lazily on first reconciliation; afterwards updates only
/// when the score strictly increased, refreshing the denormalized username
/// and profile image snapshot. Returns the entry and whether it was written.
pub fn reconcile(
    conn: &Connection,
    user: &User,
    now: DateTime<Utc>,
) -> Result<(LeaderboardEntry, bool)> {
    let key = month_key(now.date_naive());

    let existing = get_entry(conn, user.id, &key)?;
    match existing {
        None => {
            conn.execute(
                r#"
                INSERT INTO leaderboard_entries
                    (user_id, month_year, username, profile_image_uri, score, last_updated)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    user.id,
                    key,
                    user.username,
                    user.profile_image,
                    user.global_score,
                    now.to_rfc3339(),
                ],
            )?;
            let entry = get_entry(conn, user.id, &key)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            Ok((entry, true))
        }
        Some(entry) if user.global_score > entry.score => {
            conn.execute(
                r#"
                UPDATE leaderboard_entries
                SET score = ?1, username = ?2, profile_image_uri = ?3, last_updated = ?4
                WHERE user_id = ?5 AND month_year = ?6
                "#,
                params![
                    user.global_score,
                    user.username,
                    user.profile_image,
                    now.to_rfc3339(),
                    user.id,
                    key,
                ],
            )?;
            let entry = get_entry(conn, user.id, &key)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            Ok((entry, true))
        }
        // Lower or equal score: no mutation (monotonicity invariant)
        Some(entry) => Ok((entry, false)),
    }
}

pub fn get_entry(
    conn: &Connection,
    user_id: i64,
    month_year: &str,
) -> Result<Option<LeaderboardEntry>> {
    conn.query_row(
        r#"
        SELECT id, user_id, username, profile_image_uri, score, month_year, last_updated
        FROM leaderboard_entries WHERE user_id = ?1 AND month_year = ?2
        "#,
        params![user_id, month_year],
        row_to_entry,
    )
    .optional()
}

/// Ranked top-N for a month bucket, best score first.
/// Ties rank by earliest last_updated so ordering is deterministic.
pub fn top_for_month(
    conn: &Connection,
    month_year: &str,
    limit: i64,
) -> Result<Vec<RankedEntry>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT user_id, username, profile_image_uri, score
        FROM leaderboard_entries WHERE month_year = ?1
        ORDER BY score DESC, last_updated ASC
        LIMIT ?2
        "#,
    )?;
    let entries = stmt
        .query_map(params![month_year, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, (user_id, username, profile_image_uri, score))| RankedEntry {
            rank: index + 1,
            user_id,
            username,
            profile_image_uri,
            score,
        })
        .collect())
}

/// Previous month's leaderboard, or None when that month has no entries.
/// "No data" is distinct from an empty board for the client.
pub fn past_top(
    conn: &Connection,
    today: NaiveDate,
    limit: i64,
) -> Result<Option<PastLeaderboard>> {
    let Some(last_month) = previous_month(today) else {
        return Ok(None);
    };

    let data = top_for_month(conn, &month_key(last_month), limit)?;
    if data.is_empty() {
        return Ok(None);
    }

    Ok(Some(PastLeaderboard {
        month: last_month.format("%B %Y").to_string(),
        year: last_month.year(),
        data,
    }))
}

fn row_to_entry(row: &Row<'_>) -> Result<LeaderboardEntry> {
    let last_updated: String = row.get(6)?;
    Ok(LeaderboardEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        profile_image_uri: row.get(3)?,
        score: row.get(4)?,
        month_year: row.get(5)?,
        last_updated: DateTime::parse_from_rfc3339(&last_updated)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::{add_to_global_score, create_user, get_user};
    use crate::testing::TestEnv;
    use chrono::TimeZone;

    fn may(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap()
    }

    fn user_with_score(env: &TestEnv, name: &str, score: i64) -> User {
        let id = create_user(
            &env.conn,
            name,
            &format!("{name}@example.com"),
            "hash",
        )
        .unwrap();
        add_to_global_score(&env.conn, id, score).unwrap();
        get_user(&env.conn, id).unwrap().unwrap()
    }

    #[test]
    fn first_reconcile_creates_entry_lazily() {
        let env = TestEnv::new().unwrap();
        let user = user_with_score(&env, "ana", 100);

        let (entry, written) = reconcile(&env.conn, &user, may(3)).unwrap();
        assert!(written);
        assert_eq!(entry.score, 100);
        assert_eq!(entry.month_year, "2026-05");
        assert_eq!(entry.username, "ana");
    }

    #[test]
    fn score_never_decreases_within_a_month() {
        let env = TestEnv::new().unwrap();
        let mut user = user_with_score(&env, "ben", 100);

        reconcile(&env.conn, &user, may(3)).unwrap();

        // Lower score later in the month: entry stays at 100
        user.global_score = 90;
        let (entry, written) = reconcile(&env.conn, &user, may(10)).unwrap();
        assert!(!written);
        assert_eq!(entry.score, 100);

        // Higher score raises it
        user.global_score = 130;
        let (entry, written) = reconcile(&env.conn, &user, may(20)).unwrap();
        assert!(written);
        assert_eq!(entry.score, 130);
    }

    #[test]
    fn snapshot_fields_refresh_on_update_only() {
        let env = TestEnv::new().unwrap();
        let mut user = user_with_score(&env, "cleo", 50);
        reconcile(&env.conn, &user, may(1)).unwrap();

        user.profile_image = Some("avatar.png".to_string());
        user.global_score = 40;
        let (entry, _) = reconcile(&env.conn, &user, may(2)).unwrap();
        assert!(entry.profile_image_uri.is_none());

        user.global_score = 60;
        let (entry, _) = reconcile(&env.conn, &user, may(3)).unwrap();
        assert_eq!(entry.profile_image_uri.as_deref(), Some("avatar.png"));
    }

    #[test]
    fn months_are_separate_buckets() {
        let env = TestEnv::new().unwrap();
        let user = user_with_score(&env, "dan", 70);

        reconcile(&env.conn, &user, may(30)).unwrap();
        let june = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        reconcile(&env.conn, &user, june).unwrap();

        assert!(get_entry(&env.conn, user.id, "2026-05").unwrap().is_some());
        assert!(get_entry(&env.conn, user.id, "2026-06").unwrap().is_some());
    }

    #[test]
    fn top_ranks_by_score_descending() {
        let env = TestEnv::new().unwrap();
        for (name, score) in [("eve", 30), ("fay", 90), ("gus", 60)] {
            let user = user_with_score(&env, name, score);
            reconcile(&env.conn, &user, may(5)).unwrap();
        }

        let top = top_for_month(&env.conn, "2026-05", 100).unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["fay", "gus", "eve"]);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[2].rank, 3);

        let top2 = top_for_month(&env.conn, "2026-05", 2).unwrap();
        assert_eq!(top2.len(), 2);
    }

    #[test]
    fn past_board_is_none_without_data() {
        let env = TestEnv::new().unwrap();
        let june_day = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert!(past_top(&env.conn, june_day, 100).unwrap().is_none());

        let user = user_with_score(&env, "hal", 20);
        reconcile(&env.conn, &user, may(20)).unwrap();

        let board = past_top(&env.conn, june_day, 100).unwrap().unwrap();
        assert_eq!(board.month, "May 2026");
        assert_eq!(board.year, 2026);
        assert_eq!(board.data.len(), 1);
    }
}
