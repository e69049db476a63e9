//! Registration, login and logout handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::db as auth_db;
use super::middleware::AuthContext;
use super::{password, session};
use crate::config;
use crate::db::{self, users};
use crate::domain::User;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    /// Username or email; either identifies the account
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Password policy: length, upper, lower, digit, special character
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < config::MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters.",
            config::MIN_PASSWORD_LENGTH
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::Validation(
            "The password must contain at least one uppercase letter.".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ApiError::Validation(
            "The password must contain at least one lowercase letter.".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "The password must contain at least one number.".to_string(),
        ));
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        return Err(ApiError::Validation(
            "The password must contain at least one special character.".to_string(),
        ));
    }
    Ok(())
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let username = body
        .username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Please fill in all fields.".to_string()))?;
    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Please fill in all fields.".to_string()))?;
    let password = body
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Please fill in all fields.".to_string()))?;

    if !looks_like_email(email) {
        return Err(ApiError::Validation(
            "Please enter a valid email address.".to_string(),
        ));
    }
    validate_password(password)?;

    let conn = db::try_lock(&state.db)?;
    if users::identity_taken(&conn, username, email)? {
        return Err(ApiError::Validation(
            "The username or email address is already in use.".to_string(),
        ));
    }

    let hash = password::hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::Database
    })?;
    let user_id = users::create_user(&conn, username, &email.to_lowercase(), &hash)?;

    let token = session::generate_session_token();
    auth_db::create_session(&conn, user_id, &token, config::SESSION_DURATION_HOURS)?;

    let user = users::get_user(&conn, user_id)?.ok_or(ApiError::Database)?;
    tracing::info!("Registered user {:?}", user.username);
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identity = body
        .email
        .as_deref()
        .or(body.username.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Please fill in all fields.".to_string()))?;
    let password = body
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("Please fill in all fields.".to_string()))?;

    let conn = db::try_lock(&state.db)?;
    let Some((user_id, stored_hash)) = users::get_credentials(&conn, identity)? else {
        return Err(ApiError::Unauthorized);
    };
    if !password::verify_password(password, &stored_hash) {
        return Err(ApiError::Unauthorized);
    }

    users::touch_last_active(&conn, user_id)?;
    let token = session::generate_session_token();
    auth_db::create_session(&conn, user_id, &token, config::SESSION_DURATION_HOURS)?;

    let user = users::get_user(&conn, user_id)?.ok_or(ApiError::Database)?;
    Ok(Json(AuthResponse { token, user }))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
    headers: axum::http::HeaderMap,
) -> Result<Json<Value>, ApiError> {
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        let conn = db::try_lock(&state.db)?;
        auth_db::delete_session(&conn, token.trim())?;
    }
    tracing::debug!("User {} logged out", auth.user.id);
    Ok(Json(json!({ "message": "Logged out." })))
}
