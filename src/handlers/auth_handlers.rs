use anyhow::anyhow;
use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::{CookieJar, WithRejection};
use tracing::{info, instrument, warn};

use crate::auth::{client_key, verify_password, AdminSession, AuthState};
use crate::dto::{LoginDto, LoginResponseDto};
use crate::errors::ApiError;

/// Handler for the admin login
///
/// This function handles POST requests to `/api/auth/login`.
///
/// ### Arguments
///
/// * `auth` - The auth state
/// * `jar` - The request cookies; the session cookie is added to them
/// * `headers` - The request headers, used to key the attempt limiter
/// * `payload` - The submitted username and password
///
/// ### Returns
///
/// The session token and its expiry, with the session cookie set
#[instrument(skip(auth, jar, headers, payload), fields(username = %payload.username))]
pub async fn login_handler(
    State(auth): State<AuthState>,
    jar: CookieJar,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<LoginDto>, ApiError>,
) -> Result<(CookieJar, Json<LoginResponseDto>), ApiError> {
    let hash = auth.password_hash().ok_or(ApiError::LoginDisabled)?.to_string();

    let key = client_key(&headers, &payload.username);
    if !auth.limiter().check(&key) {
        warn!("Login throttled for {}", key);
        return Err(ApiError::TooManyAttempts);
    }

    let username_ok = payload.username.trim() == auth.username();
    // the hash is checked even for a wrong username so both cases take as long
    let password_ok = tokio::task::spawn_blocking(move || verify_password(&payload.password, &hash))
        .await
        .map_err(|e| ApiError::Database(anyhow!("Password check failed: {}", e)))?;

    if !(username_ok && password_ok) {
        auth.limiter().record_failure(&key);
        warn!("Failed login attempt for {}", key);
        return Err(ApiError::InvalidCredentials);
    }

    auth.limiter().reset(&key);
    let (token, expires_at) = auth
        .issue_session()
        .map_err(|e| ApiError::Database(anyhow!("Failed to issue session: {}", e)))?;
    info!("Admin logged in, session valid until {}", expires_at);

    let jar = jar.add(auth.session_cookie(token.clone()));
    Ok((
        jar,
        Json(LoginResponseDto {
            username: auth.username().to_string(),
            expires_at,
            token,
        }),
    ))
}

/// Handler for logging out
///
/// This function handles POST requests to `/api/auth/logout`. The token
/// itself stays valid until it expires; only the cookie is cleared.
#[instrument(skip(auth, jar))]
pub async fn logout_handler(State(auth): State<AuthState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    info!("Admin logged out");
    (jar.remove(auth.cleared_cookie()), StatusCode::NO_CONTENT)
}

/// Handler reporting the current admin session
///
/// This function handles GET requests to `/admin/api/session`.
pub async fn session_handler(Extension(session): Extension<AdminSession>) -> Json<AdminSession> {
    Json(session)
}
