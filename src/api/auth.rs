//! Bearer token gate for the authenticated routes.

use crate::{accounts::TokenError, api::AppState, api::error::ApiError};
use axum::{
    extract::{Request, State},
    http::{Method, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

/// Identity extracted from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Username carried in the token claims.
    pub username: String,
}

/// Verify `Authorization: Bearer <token>` and attach [`AuthenticatedUser`] to the request.
///
/// `OPTIONS` requests pass through unauthenticated.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(TokenError::Missing)?;
    let claims = state.tokens.verify(token)?;

    tracing::debug!(username = %claims.username, path = %request.uri().path(), "Bearer verified");
    request.extensions_mut().insert(AuthenticatedUser {
        username: claims.username,
    });
    Ok(next.run(request).await)
}
