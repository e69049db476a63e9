//! Quiz endpoints: random/daily question delivery and server-side grading.
//!
//! Questions are delivered without their accepted answers; grading happens
//! here against the catalog, never on the client.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::AuthContext;
use crate::config;
use crate::db::{self, catalog, users};
use crate::domain::{Exercise, Level};
use crate::error::ApiError;
use crate::scoring;
use crate::state::AppState;

/// Client-facing question: an exercise stripped of its accepted answers
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionOut {
  pub id: i64,
  pub lesson_id: i64,
  #[serde(rename = "type")]
  pub kind: String,
  pub question: String,
  pub options: Vec<String>,
}

impl From<Exercise> for QuizQuestionOut {
  fn from(ex: Exercise) -> Self {
    Self {
      id: ex.id,
      lesson_id: ex.lesson_id,
      kind: ex.kind,
      question: ex.question,
      options: ex.options,
    }
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
  pub language_id: Option<i64>,
  pub level: Option<String>,
}

impl QuestionQuery {
  fn language_id(&self) -> Result<i64, ApiError> {
    self
      .language_id
      .ok_or_else(|| ApiError::Validation("Language ID is required.".to_string()))
  }

  fn level(&self) -> Result<Option<Level>, ApiError> {
    match self.level.as_deref() {
      None => Ok(None),
      Some(raw) => Level::from_str(raw)
        .map(Some)
        .ok_or_else(|| ApiError::Validation(format!("Unknown level: {:?}", raw))),
    }
  }
}

/// GET /lessons/questions/random
pub async fn random_question(
  State(state): State<AppState>,
  _auth: AuthContext,
  Query(query): Query<QuestionQuery>,
) -> Result<Json<Value>, ApiError> {
  let language_id = query.language_id()?;
  let level = query.level()?;

  let conn = db::try_lock(&state.db)?;
  let exercise = catalog::random_exercise(&conn, language_id, level)?
    .ok_or_else(|| ApiError::NotFound("Question".to_string()))?;
  Ok(Json(json!({ "question": QuizQuestionOut::from(exercise) })))
}

/// GET /lessons/questions/daily/{language_id}
///
/// Deterministic for the calendar day: every user sees the same question.
pub async fn daily_question(
  State(state): State<AppState>,
  _auth: AuthContext,
  Path(language_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let exercise = catalog::daily_exercise(&conn, language_id, Utc::now().date_naive())?
    .ok_or_else(|| ApiError::NotFound("Question".to_string()))?;
  Ok(Json(json!({ "question": QuizQuestionOut::from(exercise) })))
}

/// GET /lessons/questions/quick-quiz
pub async fn quick_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<QuestionQuery>,
) -> Result<Json<Value>, ApiError> {
  quiz_batch(&state, auth, query, config::QUICK_QUIZ_SIZE).await
}

/// GET /lessons/questions/timed-quiz
pub async fn timed_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<QuestionQuery>,
) -> Result<Json<Value>, ApiError> {
  quiz_batch(&state, auth, query, config::TIMED_QUIZ_SIZE).await
}

async fn quiz_batch(
  state: &AppState,
  _auth: AuthContext,
  query: QuestionQuery,
  size: i64,
) -> Result<Json<Value>, ApiError> {
  let language_id = query.language_id()?;
  let level = query.level()?;

  let conn = db::try_lock(&state.db)?;
  let exercises = catalog::random_exercises(&conn, language_id, level, size)?;
  if exercises.is_empty() {
    return Err(ApiError::NotFound("Questions".to_string()));
  }
  let questions: Vec<QuizQuestionOut> =
    exercises.into_iter().map(QuizQuestionOut::from).collect();
  Ok(Json(json!({ "questions": questions })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerBody {
  pub question_id: Option<i64>,
  pub selected_answer: Option<String>,
}

impl CheckAnswerBody {
  fn parts(&self) -> Result<(i64, &str), ApiError> {
    let id = self
      .question_id
      .ok_or_else(|| ApiError::Validation("Question ID is required.".to_string()))?;
    let answer = self
      .selected_answer
      .as_deref()
      .ok_or_else(|| ApiError::Validation("An answer is required.".to_string()))?;
    Ok((id, answer))
  }
}

/// POST /lessons/questions/check-answer
///
/// Grades a standalone quiz answer and awards the fixed point value on a
/// correct answer via an atomic score increment.
pub async fn check_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<CheckAnswerBody>,
) -> Result<Json<Value>, ApiError> {
  let (question_id, answer) = body.parts()?;

  let conn = db::try_lock(&state.db)?;
  let exercise = catalog::get_exercise(&conn, question_id)?
    .ok_or_else(|| ApiError::NotFound("Question".to_string()))?;

  let evaluation = scoring::evaluate(&exercise, answer)?;
  let points_earned = if evaluation.is_correct {
    users::add_to_global_score(&conn, auth.user.id, config::POINTS_PER_CORRECT_ANSWER)?;
    config::POINTS_PER_CORRECT_ANSWER
  } else {
    0
  };

  tracing::debug!(
    user = auth.user.id,
    question = question_id,
    correct = evaluation.is_correct,
    "Quiz answer graded"
  );
  Ok(Json(json!({
    "isCorrect": evaluation.is_correct,
    "explanation": evaluation.explanation,
    "pointsEarned": points_earned,
    "message": if evaluation.is_correct { "Correct answer!" } else { "Wrong answer." },
  })))
}

/// POST /lessons/questions/daily/check-answer
///
/// One attempt per calendar day, correct or not: the gate date is written
/// before the response regardless of the grading outcome.
pub async fn check_daily_answer(
  State(state): State<AppState>,
  auth: AuthContext,
  Json(body): Json<CheckAnswerBody>,
) -> Result<Json<Value>, ApiError> {
  let (question_id, answer) = body.parts()?;

  let today = Utc::now().date_naive();
  let status = scoring::daily_status(auth.user.last_daily_question_answered, today);
  if status.has_answered_today {
    return Err(ApiError::AlreadyAnsweredToday {
      // Gate just reported answered-today, so the next attempt time is set
      next_attempt_time: status.next_attempt_time.unwrap_or_default(),
    });
  }

  let conn = db::try_lock(&state.db)?;
  let exercise = catalog::get_exercise(&conn, question_id)?
    .ok_or_else(|| ApiError::NotFound("Question".to_string()))?;

  let evaluation = scoring::evaluate(&exercise, answer)?;
  users::set_last_daily_answered(&conn, auth.user.id, today)?;

  let points_earned = if evaluation.is_correct {
    users::add_to_global_score(&conn, auth.user.id, config::POINTS_PER_CORRECT_ANSWER)?;
    config::POINTS_PER_CORRECT_ANSWER
  } else {
    0
  };

  Ok(Json(json!({
    "isCorrect": evaluation.is_correct,
    "explanation": evaluation.explanation,
    "pointsEarned": points_earned,
    "message": if evaluation.is_correct {
      "Correct! See you tomorrow."
    } else {
      "Wrong answer. Try again tomorrow."
    },
  })))
}
