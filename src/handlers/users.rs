//! User profile and lesson-completion endpoints.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::auth::AuthContext;
use crate::db::{self, catalog, progress, users};
use crate::domain::{LanguageProgress, User};
use crate::error::ApiError;
use crate::scoring;
use crate::state::AppState;

/// User record plus the per-language progress association, keyed by
/// stringified language id as the mobile client expects
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOut {
  #[serde(flatten)]
  pub user: User,
  pub language_progress: BTreeMap<String, LanguageProgress>,
}

fn profile_out(conn: &rusqlite::Connection, user: User) -> Result<ProfileOut, ApiError> {
  let language_progress = progress::list_progress(conn, user.id)?
    .into_iter()
    .map(|p| (p.language_id.to_string(), p))
    .collect();
  Ok(ProfileOut {
    user,
    language_progress,
  })
}

/// GET /user/profile
pub async fn get_profile(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let profile = profile_out(&conn, auth.user)?;
  Ok(Json(json!({ "user": profile })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
  pub username: Option<String>,
  pub profile_image: Option<String>,
}

/// PUT /user/profile
pub async fn update_profile(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<UpdateProfileBody>,
) -> Result<Json<Value>, ApiError> {
  let username = body.username.as_deref().map(str::trim);
  if let Some(name) = username {
    if name.is_empty() {
      return Err(ApiError::Validation("Username cannot be empty.".to_string()));
    }
  }

  let conn = db::try_lock(&state.db)?;
  users::update_profile(&conn, auth.user.id, username, body.profile_image.as_deref())
    .map_err(|e| match e {
      rusqlite::Error::SqliteFailure(err, _)
        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        ApiError::Validation("The username is already in use.".to_string())
      }
      other => ApiError::from(other),
    })?;

  let user = users::get_user(&conn, auth.user.id)?.ok_or(ApiError::Database)?;
  let profile = profile_out(&conn, user)?;
  Ok(Json(json!({
    "message": "Profile updated successfully!",
    "user": profile,
  })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectLanguageBody {
  pub language_id: Option<i64>,
}

/// POST /user/select-language
pub async fn select_language(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<SelectLanguageBody>,
) -> Result<Json<Value>, ApiError> {
  let language_id = body
    .language_id
    .ok_or_else(|| ApiError::Validation("Language ID is required.".to_string()))?;

  let conn = db::try_lock(&state.db)?;
  if catalog::get_language(&conn, language_id)?.is_none() {
    return Err(ApiError::NotFound("Language".to_string()));
  }
  users::set_selected_language(&conn, auth.user.id, language_id)?;

  let user = users::get_user(&conn, auth.user.id)?.ok_or(ApiError::Database)?;
  let profile = profile_out(&conn, user)?;
  Ok(Json(json!({
    "message": "Language selected successfully!",
    "user": profile,
  })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonBody {
  pub lesson_id: Option<i64>,
  pub earned_points: Option<i64>,
  #[serde(default)]
  pub is_daily_question: bool,
}

/// POST /user/complete-lesson (also mounted at /progress/complete-lesson)
///
/// Lesson-level completion: unions the lesson into the completed set for the
/// user's selected language and credits `earned_points` unconditionally.
/// The per-exercise idempotence check lives in check-lesson-answer; this
/// endpoint deliberately keeps the original's double-award surface.
pub async fn complete_lesson(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<CompleteLessonBody>,
) -> Result<Json<Value>, ApiError> {
  let lesson_id = body
    .lesson_id
    .ok_or_else(|| ApiError::Validation("Lesson ID is required.".to_string()))?;
  let earned_points = body.earned_points.unwrap_or(0);
  if earned_points < 0 {
    return Err(ApiError::Validation("Earned points cannot be negative.".to_string()));
  }

  let conn = db::try_lock(&state.db)?;
  if catalog::get_lesson(&conn, lesson_id)?.is_none() {
    return Err(ApiError::NotFound("Lesson".to_string()));
  }

  match auth.user.selected_language_id {
    Some(language_id) => {
      progress::mark_lesson_completed(&conn, auth.user.id, language_id, lesson_id)?;
    }
    None => {
      // Score still moves; the progress map has no language to key on
      tracing::warn!(
        user = auth.user.id,
        lesson = lesson_id,
        "Lesson completed with no selected language; skipping progress update"
      );
    }
  }

  users::add_to_global_score(&conn, auth.user.id, earned_points)?;
  if body.is_daily_question {
    users::set_last_daily_answered(&conn, auth.user.id, Utc::now().date_naive())?;
  }

  let user = users::get_user(&conn, auth.user.id)?.ok_or(ApiError::Database)?;
  let profile = profile_out(&conn, user)?;
  Ok(Json(json!({
    "message": "Lesson completed.",
    "user": profile,
  })))
}

#[derive(Deserialize)]
pub struct UpdateScoreBody {
  pub points: Option<i64>,
}

/// POST /user/update-global-score
///
/// The global score is monotonically non-decreasing; negative deltas are
/// rejected rather than applied.
pub async fn update_global_score(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<UpdateScoreBody>,
) -> Result<Json<Value>, ApiError> {
  let points = body
    .points
    .ok_or_else(|| ApiError::Validation("Points are required.".to_string()))?;
  if points < 0 {
    return Err(ApiError::Validation("Points cannot be negative.".to_string()));
  }

  let conn = db::try_lock(&state.db)?;
  users::add_to_global_score(&conn, auth.user.id, points)?;

  let user = users::get_user(&conn, auth.user.id)?.ok_or(ApiError::Database)?;
  let profile = profile_out(&conn, user)?;
  Ok(Json(json!({ "user": profile })))
}

/// GET /user/daily-status
pub async fn daily_status(auth: AuthContext) -> Json<scoring::DailyStatus> {
  Json(scoring::daily_status(
    auth.user.last_daily_question_answered,
    Utc::now().date_naive(),
  ))
}
