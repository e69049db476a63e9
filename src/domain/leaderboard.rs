use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monthly snapshot of a user's best global score.
/// Keyed by (user_id, month_year); the score never decreases for a fixed key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub id: i64,
  pub user_id: i64,
  /// Denormalized snapshot fields, refreshed on score update
  pub username: String,
  pub profile_image_uri: Option<String>,
  pub score: i64,
  /// Calendar month bucket, e.g. "2026-08"
  pub month_year: String,
  pub last_updated: DateTime<Utc>,
}

/// One row of a ranked top-N view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
  pub rank: usize,
  pub user_id: i64,
  pub username: String,
  pub profile_image_uri: Option<String>,
  pub score: i64,
}

/// Previous month's leaderboard with its display name.
/// A month with no entries is represented as an absent board, not an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastLeaderboard {
  /// Display name, e.g. "July 2026"
  pub month: String,
  pub year: i32,
  pub data: Vec<RankedEntry>,
}
