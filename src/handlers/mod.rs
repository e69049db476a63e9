//! JSON route handlers. Thin wrappers that forward to the scoring core and
//! the database layer; each handler returns `Result<_, ApiError>`.

pub mod languages;
pub mod leaderboard;
pub mod lessons;
pub mod progress;
pub mod quiz;
pub mod users;

use axum::Json;
use serde_json::{Value, json};

/// GET /health
pub async fn health() -> Json<Value> {
  Json(json!({ "ok": true }))
}
