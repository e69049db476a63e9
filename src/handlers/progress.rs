//! In-lesson answer grading with hearts and completion idempotence.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, catalog, progress, users};
use crate::error::ApiError;
use crate::scoring;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckLessonAnswerBody {
  pub lesson_id: Option<i64>,
  pub exercise_id: Option<i64>,
  pub selected_answer: Option<String>,
  /// Client-tracked hearts for the running attempt; falls back to the
  /// stored value when absent
  pub current_hearts: Option<i64>,
}

/// POST /progress/check-lesson-answer
///
/// Grades one exercise inside a lesson. A correct answer on an uncompleted
/// lesson awards the fixed point value; an incorrect one costs a heart,
/// floored at zero. Once the lesson is in the completed set the answer is
/// graded for feedback only and neither hearts nor score move.
pub async fn check_lesson_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<CheckLessonAnswerBody>,
) -> Result<Json<Value>, ApiError> {
  let lesson_id = body
    .lesson_id
    .ok_or_else(|| ApiError::Validation("Lesson ID is required.".to_string()))?;
  let exercise_id = body
    .exercise_id
    .ok_or_else(|| ApiError::Validation("Exercise ID is required.".to_string()))?;
  let answer = body
    .selected_answer
    .as_deref()
    .ok_or_else(|| ApiError::Validation("An answer is required.".to_string()))?;

  let conn = db::try_lock(&state.db)?;
  let lesson = catalog::get_lesson(&conn, lesson_id)?
    .ok_or_else(|| ApiError::NotFound("Lesson".to_string()))?;
  let exercise = lesson
    .exercises
    .iter()
    .find(|ex| ex.id == exercise_id)
    .ok_or_else(|| ApiError::NotFound("Exercise".to_string()))?;

  let language_id = lesson.language_id;
  let already_completed =
    progress::is_lesson_completed(&conn, auth.user.id, language_id, lesson_id)?;
  let stored_hearts = progress::get_progress(&conn, auth.user.id, language_id)?
    .map(|p| p.current_hearts);
  let current_hearts = body
    .current_hearts
    .or(stored_hearts)
    .unwrap_or(config::MAX_HEARTS);

  let outcome =
    scoring::complete_answer(already_completed, exercise, answer, current_hearts)?;

  if !outcome.is_completed {
    progress::set_hearts(&conn, auth.user.id, language_id, outcome.hearts_left)?;
    progress::set_last_visited(&conn, auth.user.id, language_id, lesson_id)?;
    if outcome.points_earned > 0 {
      users::add_to_global_score(&conn, auth.user.id, outcome.points_earned)?;
    }
  }

  tracing::debug!(
    user = auth.user.id,
    lesson = lesson_id,
    exercise = exercise_id,
    correct = outcome.is_correct,
    hearts = outcome.hearts_left,
    "Lesson answer graded"
  );
  Ok(Json(json!({
    "isCorrect": outcome.is_correct,
    "heartsLeft": outcome.hearts_left,
    "pointsEarned": outcome.points_earned,
    "explanation": outcome.explanation,
    "isCompleted": outcome.is_completed,
  })))
}
