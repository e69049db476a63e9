//! Request error taxonomy.
//!
//! Every fallible handler returns `Result<_, ApiError>`; the error maps to a
//! JSON body with a `message` field and the appropriate status code. Errors
//! are local to a single request - score mutations that happened earlier in
//! the same request are not rolled back (at-least-once semantics).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::db::DbLockError;
use crate::scoring::UnsupportedExerciseType;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input
    Validation(String),
    /// Missing or invalid credential
    Unauthorized,
    /// Authenticated but not allowed (admin-only operations)
    Forbidden,
    /// Referenced user/language/lesson/exercise absent
    NotFound(String),
    /// Daily gate violation; carries the countdown target for the client
    AlreadyAnsweredToday { next_attempt_time: DateTime<Utc> },
    /// Catalog integrity fault: an exercise kind the grader does not know
    UnsupportedExerciseType(String),
    /// Database failure or poisoned lock
    Database,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::Unauthorized => write!(f, "Not authorized."),
            Self::Forbidden => write!(f, "You are not allowed to perform this action."),
            Self::NotFound(what) => write!(f, "{} not found.", what),
            Self::AlreadyAnsweredToday { .. } => {
                write!(f, "Daily question already answered today.")
            }
            Self::UnsupportedExerciseType(kind) => {
                write!(f, "Unsupported exercise type: {:?}", kind)
            }
            Self::Database => write!(f, "Server error."),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyAnsweredToday { .. } => StatusCode::CONFLICT,
            Self::UnsupportedExerciseType(_) | Self::Database => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::UnsupportedExerciseType(kind) => {
                tracing::error!("Catalog integrity fault, unknown exercise type: {:?}", kind);
            }
            Self::Database => {
                tracing::error!("Database error while handling request");
            }
            _ => {}
        }

        let body = match &self {
            Self::AlreadyAnsweredToday { next_attempt_time } => json!({
                "message": self.to_string(),
                "nextAttemptTime": next_attempt_time,
            }),
            _ => json!({ "message": self.to_string() }),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        tracing::warn!("rusqlite error: {}", e);
        Self::Database
    }
}

impl From<DbLockError> for ApiError {
    fn from(_: DbLockError) -> Self {
        Self::Database
    }
}

impl From<UnsupportedExerciseType> for ApiError {
    fn from(e: UnsupportedExerciseType) -> Self {
        Self::UnsupportedExerciseType(e.0)
    }
}
