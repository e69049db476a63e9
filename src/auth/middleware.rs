//! Authentication extractors.
//!
//! Clients authenticate with `Authorization: Bearer <token>`; the token is a
//! server-issued session id. Add `AuthContext` as a handler parameter to
//! require authentication, `AdminContext` to additionally require the admin
//! role.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use super::db as auth_db;
use crate::db;
use crate::db::users;
use crate::domain::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated request context with the resolved user record.
#[derive(Clone)]
pub struct AuthContext {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;

        let conn = db::try_lock(&state.db)?;
        let user_id = auth_db::get_session_user(&conn, &token)?
            .ok_or(ApiError::Unauthorized)?;
        let user = users::get_user(&conn, user_id)?.ok_or(ApiError::Unauthorized)?;
        users::touch_last_active(&conn, user.id)?;

        Ok(AuthContext { user })
    }
}

/// Admin-only request context.
#[derive(Clone)]
pub struct AdminContext {
    pub user: User,
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        if auth.user.role != Role::Admin {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminContext { user: auth.user })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
