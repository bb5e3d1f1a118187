//! Bearer-token guard for the admin API.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::AppError;
use crate::AppState;

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Compare tokens without leaking how many leading bytes match.
pub fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Middleware rejecting admin requests without the configured token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorised = bearer_token(request.headers())
        .map(|token| tokens_match(token, &state.config.admin_api_token))
        .unwrap_or(false);

    if !authorised {
        warn!(path = %request.uri().path(), "Rejected admin request");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
