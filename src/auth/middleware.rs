use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::{AuthState, SESSION_COOKIE};
use crate::errors::ApiError;

/// The authenticated admin, available to handlers behind the guard
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Candidate session tokens: the cookie first, then a bearer header
fn session_tokens(jar: &CookieJar, headers: &HeaderMap) -> Vec<String> {
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    cookie.into_iter().chain(bearer).collect()
}

/// Rejects requests without a valid admin session
///
/// A stale cookie does not shadow a valid bearer token.
pub async fn require_admin(
    State(auth): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = session_tokens(&jar, request.headers())
        .iter()
        .find_map(|token| match auth.verify_session(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("Rejected session: {}", e);
                None
            }
        })
        .ok_or(ApiError::Unauthorized)?;

    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(ApiError::Unauthorized)?;
    request.extensions_mut().insert(AdminSession {
        username: claims.sub,
        expires_at,
    });

    Ok(next.run(request).await)
}
