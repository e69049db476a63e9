//! Lesson catalog endpoints: listing, detail, admin authoring.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AdminContext;
use crate::db::{self, catalog};
use crate::domain::{ExerciseType, Level};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /lessons/by-language/{language_id}
pub async fn by_language(
  State(state): State<AppState>,
  Path(language_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let lessons = catalog::lessons_by_language(&conn, language_id)?;
  if lessons.is_empty() {
    return Err(ApiError::NotFound("Lessons for this language".to_string()));
  }
  Ok(Json(json!({
    "success": true,
    "lessons": lessons,
  })))
}

/// GET /lessons/{lesson_id}
pub async fn by_id(
  State(state): State<AppState>,
  Path(lesson_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let lesson = catalog::get_lesson(&conn, lesson_id)?
    .ok_or_else(|| ApiError::NotFound("Lesson".to_string()))?;
  Ok(Json(json!({ "lesson": lesson })))
}

/// Accepted answers arrive as a bare string or an array of strings
#[derive(Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

impl OneOrMany {
  fn into_vec(self) -> Vec<String> {
    match self {
      Self::One(s) => vec![s],
      Self::Many(v) => v,
    }
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExerciseBody {
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub question: Option<String>,
  #[serde(default)]
  pub options: Vec<String>,
  pub correct_answer: Option<OneOrMany>,
  pub explanation: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLessonBody {
  pub title: Option<String>,
  pub description: Option<String>,
  /// Language id
  pub language: Option<i64>,
  pub level: Option<String>,
  pub order: Option<i64>,
  #[serde(default)]
  pub exercises: Vec<NewExerciseBody>,
}

/// POST /lessons (admin)
///
/// Authoring-time validation: exercise kinds must be known, and for multiple
/// choice every accepted answer must appear among the options. Catching this
/// here keeps the grading path free of catalog integrity checks.
pub async fn create(
  State(state): State<AppState>,
  admin: AdminContext,
  Json(body): Json<NewLessonBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
  let title = body
    .title
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| missing("Title, language, level and order are required."))?;
  let language_id = body
    .language
    .ok_or_else(|| missing("Title, language, level and order are required."))?;
  let level_raw = body
    .level
    .as_deref()
    .ok_or_else(|| missing("Title, language, level and order are required."))?;
  let order = body
    .order
    .ok_or_else(|| missing("Title, language, level and order are required."))?;

  let level = Level::from_str(level_raw)
    .ok_or_else(|| ApiError::Validation(format!("Unknown level: {:?}", level_raw)))?;

  // Validate every exercise before inserting anything
  let mut exercises = Vec::with_capacity(body.exercises.len());
  for (index, ex) in body.exercises.into_iter().enumerate() {
    exercises.push(validate_exercise(index, ex)?);
  }

  let conn = db::try_lock(&state.db)?;
  if catalog::get_language(&conn, language_id)?.is_none() {
    return Err(ApiError::NotFound("Language".to_string()));
  }

  let lesson_id = catalog::insert_lesson(
    &conn,
    title,
    body.description.as_deref(),
    language_id,
    level,
    order,
  )?;
  for (position, ex) in exercises.iter().enumerate() {
    catalog::insert_exercise(
      &conn,
      lesson_id,
      position as i64,
      &ex.kind,
      &ex.question,
      &ex.options,
      &ex.answers,
      ex.explanation.as_deref(),
    )?;
  }

  let lesson = catalog::get_lesson(&conn, lesson_id)?.ok_or(ApiError::Database)?;
  tracing::info!("Admin {} created lesson {:?}", admin.user.id, lesson.title);
  Ok((StatusCode::CREATED, Json(json!({
    "success": true,
    "lesson": lesson,
  }))))
}

struct ValidatedExercise {
  kind: String,
  question: String,
  options: Vec<String>,
  answers: Vec<String>,
  explanation: Option<String>,
}

fn validate_exercise(index: usize, ex: NewExerciseBody) -> Result<ValidatedExercise, ApiError> {
  let kind = ex
    .kind
    .filter(|k| !k.is_empty())
    .ok_or_else(|| ApiError::Validation(format!("Exercise {} is missing a type.", index)))?;
  let parsed = ExerciseType::from_str(&kind)
    .ok_or_else(|| ApiError::Validation(format!("Unknown exercise type: {:?}", kind)))?;

  let question = ex
    .question
    .filter(|q| !q.trim().is_empty())
    .ok_or_else(|| ApiError::Validation(format!("Exercise {} is missing a question.", index)))?;

  let answers = ex
    .correct_answer
    .map(OneOrMany::into_vec)
    .unwrap_or_default();
  if answers.is_empty() {
    return Err(ApiError::Validation(format!(
      "Exercise {} has no accepted answer.",
      index
    )));
  }

  if parsed == ExerciseType::MultipleChoice {
    if ex.options.is_empty() {
      return Err(ApiError::Validation(format!(
        "Exercise {} is multiple choice but has no options.",
        index
      )));
    }
    for answer in &answers {
      if !ex.options.contains(answer) {
        return Err(ApiError::Validation(format!(
          "Exercise {}: accepted answer {:?} is not among the options.",
          index, answer
        )));
      }
    }
  }

  Ok(ValidatedExercise {
    kind,
    question,
    options: ex.options,
    answers,
    explanation: ex.explanation,
  })
}

fn missing(msg: &str) -> ApiError {
  ApiError::Validation(msg.to_string())
}
