//! Session resolution and permission checks.
//!
//! Sessions are issued by the external auth layer; this side only resolves a
//! bearer token to a user record and checks restriction bits before
//! mutating operations.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use db::models::user::User;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// The authenticated user behind the request's session token.
///
/// Request-scoped by construction: handlers that mutate state take this as
/// an extractor argument instead of reading ambient session state.
#[derive(Debug, Clone)]
pub struct AuthSession(pub User);

impl AuthSession {
    /// Require at least one bit of `mask`, logging the actor on denial.
    pub fn require_any(&self, mask: i64, action: &str) -> Result<&User, ApiError> {
        if self.0.has_any_restriction(mask) {
            Ok(&self.0)
        } else {
            warn!(
                "User {} had insufficient permissions to {}",
                self.0.cid, action
            );
            Err(ApiError::Forbidden(format!(
                "insufficient permissions to {action}"
            )))
        }
    }
}

/// Extract bearer token from the Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)
            .ok_or_else(|| ApiError::Forbidden("missing session token".to_string()))?;

        let user = User::find_by_session_token(&state.db().pool, token)
            .await?
            .ok_or_else(|| ApiError::Forbidden("invalid session token".to_string()))?;

        Ok(AuthSession(user))
    }
}
