use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
  #[serde(rename = "user")]
  User,
  #[serde(rename = "admin")]
  Admin,
}

impl Role {
  pub fn from_str(s: &str) -> Self {
    match s {
      "admin" => Self::Admin,
      _ => Self::User,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Admin => "admin",
    }
  }
}

/// A registered user. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub role: Role,
  pub global_score: i64,
  /// Carried but never incremented by any transition (dead field in the
  /// observed design, kept for schema compatibility)
  pub daily_streak: i64,
  pub selected_language_id: Option<i64>,
  pub profile_image: Option<String>,
  /// Day-granular gate for the daily bonus question
  pub last_daily_question_answered: Option<NaiveDate>,
  pub last_active_date: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

/// Per-language progress: completed lesson set, last visited lesson and the
/// hearts counter for the current attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProgress {
  pub language_id: i64,
  pub completed_lesson_ids: Vec<i64>,
  pub last_visited_lesson_id: Option<i64>,
  /// In [0, MAX_HEARTS]; defaults to MAX_HEARTS on first touch of a language
  pub current_hearts: i64,
}
