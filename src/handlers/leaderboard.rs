//! Monthly leaderboard endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{Value, json};

use crate::auth::{AdminContext, AuthContext};
use crate::config;
use crate::db::{self, leaderboard, users};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /leaderboard/current
pub async fn current(
  State(state): State<AppState>,
  _auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let key = leaderboard::month_key(Utc::now().date_naive());
  let entries = leaderboard::top_for_month(&conn, &key, config::LEADERBOARD_LIMIT)?;
  Ok(Json(json!(entries)))
}

/// GET /leaderboard/past
///
/// Responds with JSON null when the previous month has no entries, which the
/// client renders as "no data" rather than an empty board.
pub async fn past(
  State(state): State<AppState>,
  _auth: AuthContext,
) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let board =
    leaderboard::past_top(&conn, Utc::now().date_naive(), config::LEADERBOARD_LIMIT)?;
  Ok(Json(json!(board)))
}

/// POST /leaderboard/update
///
/// Folds the caller's current global score into this month's entry. The
/// stored score only ever goes up; a lower or equal score leaves the entry
/// untouched and says so in the response.
pub async fn update(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<(StatusCode, Json<Value>), ApiError> {
  let conn = db::try_lock(&state.db)?;
  // Re-read the user so the reconciled score reflects any increments since
  // the session was resolved
  let user = users::get_user(&conn, auth.user.id)?.ok_or(ApiError::Database)?;
  let created_before = leaderboard::get_entry(
    &conn,
    user.id,
    &leaderboard::month_key(Utc::now().date_naive()),
  )?
  .is_none();

  let (entry, written) = leaderboard::reconcile(&conn, &user, Utc::now())?;

  let (status, message) = if created_before && written {
    (StatusCode::CREATED, "New entry added to leaderboard.")
  } else if written {
    (StatusCode::OK, "Leaderboard score updated successfully.")
  } else {
    (StatusCode::OK, "New score is lower or equal, no update performed.")
  };

  tracing::debug!(
    user = user.id,
    score = entry.score,
    written,
    "Leaderboard reconciled"
  );
  Ok((status, Json(json!({ "message": message, "entry": entry }))))
}

/// POST /leaderboard/reset-monthly
///
/// Entries are already bucketed by month, so the rollover needs no data
/// movement. The endpoint exists for the ops scheduler and only logs.
pub async fn reset_monthly(_admin: AdminContext) -> Json<Value> {
  let key = leaderboard::month_key(Utc::now().date_naive());
  tracing::info!(month = %key, "Monthly leaderboard rollover acknowledged");
  Json(json!({ "message": "Monthly leaderboard reset completed." }))
}
