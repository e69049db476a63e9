//! Language catalog endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AdminContext;
use crate::db::{self, catalog};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /languages
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
  let conn = db::try_lock(&state.db)?;
  let languages = catalog::list_languages(&conn)?;
  Ok(Json(json!({ "languages": languages })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLanguageBody {
  pub name: Option<String>,
  pub display_name: Option<String>,
  pub icon_url: Option<String>,
  pub description: Option<String>,
}

/// POST /languages (admin)
pub async fn create(
  State(state): State<AppState>,
  admin: AdminContext,
  Json(body): Json<CreateLanguageBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
  let name = body
    .name
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::Validation("Language name is required.".to_string()))?;
  let display_name = body
    .display_name
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::Validation("Display name is required.".to_string()))?;

  let conn = db::try_lock(&state.db)?;
  let id = catalog::insert_language(
    &conn,
    &name.to_lowercase(),
    display_name,
    body.icon_url.as_deref(),
    body.description.as_deref(),
  )
  .map_err(|e| match e {
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      ApiError::Validation("A language with this name already exists.".to_string())
    }
    other => ApiError::from(other),
  })?;

  let language = catalog::get_language(&conn, id)?.ok_or(ApiError::Database)?;
  tracing::info!("Admin {} created language {:?}", admin.user.id, language.name);
  Ok((StatusCode::CREATED, Json(json!({ "language": language }))))
}
