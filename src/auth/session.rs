/// Signed session tokens
///
/// A token is an HS256 JWT carrying the admin username, an expiry and a
/// nonce. Nothing is kept server-side; rotating the secret invalidates
/// every session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The admin username
    pub sub: String,
    /// Expiry as a unix timestamp in seconds
    pub exp: i64,
    pub nonce: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("malformed session token")]
    Malformed,
    #[error("session token signature does not match")]
    BadSignature,
    #[error("session expired")]
    Expired,
    #[error("session belongs to another user")]
    WrongSubject,
    #[error("session lifetime is out of range")]
    Lifetime,
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// A signer with a fresh 256-bit secret
    pub fn random() -> Self {
        let secret: [u8; 32] = rand::random();
        Self::new(&secret)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against the caller's clock in `verify`
        validation.validate_exp = false;
        validation
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Issues a token for `subject` valid for `ttl` from `now`
    pub fn issue(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), SessionError> {
        let expires_at = now.checked_add_signed(ttl).ok_or(SessionError::Lifetime)?;
        let nonce: [u8; 16] = rand::random();
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            nonce: URL_SAFE_NO_PAD.encode(nonce),
        };
        Ok((self.sign(&claims)?, expires_at))
    }

    /// Checks the signature, expiry and subject of a token
    ///
    /// The signature is checked before the claims are decoded.
    pub fn verify(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> Result<Claims, SessionError> {
        let claims = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => SessionError::BadSignature,
                _ => SessionError::Malformed,
            })?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(SessionError::Expired);
        }
        if claims.sub != expected_subject {
            return Err(SessionError::WrongSubject);
        }
        Ok(claims)
    }
}
