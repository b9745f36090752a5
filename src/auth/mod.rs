/// Admin authentication
///
/// A single admin account, Argon2 password hashes, JWT session
/// tokens carried in a cookie or bearer header, and an in-memory login
/// attempt limiter.

mod middleware;
mod password;
mod rate_limit;
mod session;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::Config;

pub use middleware::{require_admin, AdminSession};
pub use password::{hash_password, is_valid_hash, verify_password};
pub use rate_limit::{client_key, LoginLimiter};
pub use session::{Claims, SessionError, SessionSigner};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "atrium_session";

/// Longest accepted session lifetime, in hours
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// The configured session lifetime, clamped to one hour up to
/// [`MAX_SESSION_TTL_HOURS`]
pub fn session_ttl(hours: i64) -> Duration {
    let clamped = hours.clamp(1, MAX_SESSION_TTL_HOURS);
    if clamped != hours {
        warn!("session_ttl_hours={} is out of range, using {}", hours, clamped);
    }
    Duration::hours(clamped)
}

/// Credentials and session settings shared by the login handlers and
/// the admin guard
#[derive(Debug, Clone)]
pub struct AuthState {
    username: String,
    password_hash: Option<String>,
    signer: SessionSigner,
    ttl: Duration,
    secure_cookies: bool,
    limiter: Arc<LoginLimiter>,
}

impl AuthState {
    pub fn new(
        username: String,
        password_hash: Option<String>,
        signer: SessionSigner,
        ttl: Duration,
        secure_cookies: bool,
        limiter: LoginLimiter,
    ) -> Self {
        Self {
            username,
            password_hash,
            signer,
            ttl,
            secure_cookies,
            limiter: Arc::new(limiter),
        }
    }

    /// Builds the auth state from the server configuration
    ///
    /// A missing or malformed password hash disables login. Without a
    /// configured secret a random one is generated, so sessions do not
    /// survive a restart.
    pub fn from_config(config: &Config) -> Self {
        let password_hash = match &config.admin_password_hash {
            Some(hash) if is_valid_hash(hash) => Some(hash.clone()),
            Some(_) => {
                error!("admin_password_hash is not a valid PHC string, admin login is disabled");
                None
            }
            None => {
                warn!("No admin_password_hash configured, admin login is disabled");
                None
            }
        };

        let signer = match &config.session_secret {
            Some(secret) if !secret.is_empty() => SessionSigner::new(secret.as_bytes()),
            _ => {
                warn!("No session_secret configured, sessions will not survive a restart");
                SessionSigner::random()
            }
        };

        let limiter = LoginLimiter::new(
            config.login_max_attempts,
            std::time::Duration::from_secs(config.login_window_minutes.saturating_mul(60)),
        );

        Self::new(
            config.admin_username.clone(),
            password_hash,
            signer,
            session_ttl(config.session_ttl_hours),
            config.secure_cookies,
            limiter,
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The configured hash, `None` when login is disabled
    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn limiter(&self) -> &LoginLimiter {
        &self.limiter
    }

    /// Issues a session token for the admin
    pub fn issue_session(&self) -> Result<(String, DateTime<Utc>), SessionError> {
        self.signer.issue(&self.username, self.ttl, Utc::now())
    }

    pub fn verify_session(&self, token: &str) -> Result<Claims, SessionError> {
        self.signer.verify(token, &self.username, Utc::now())
    }

    /// The cookie carrying a freshly issued token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build()
    }

    /// The cookie handed to `CookieJar::remove` on logout
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}
