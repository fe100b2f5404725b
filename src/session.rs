use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;

const MAX_DEVICE_ID_LEN: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("invalid token payload: {0}")]
    InvalidPayload(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => TokenError::Malformed,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::InvalidPayload(e.to_string()),
        }
    }
}

/// The authenticated user a request acts for. Every row-level query is scoped by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Who is calling: an authenticated user, an anonymous device, or neither.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<AuthUser>,
    pub device_id: Option<String>,
}

impl Session {
    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthorized)
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

#[derive(Serialize, Deserialize)]
struct TokenClaims {
    sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: i64,
}

/// Verify an HS256 session token issued by the auth provider. `exp` is
/// required and `nbf` is honored when present; the audience is not checked.
pub fn verify_session_token(token: &str, secret: &str) -> Result<AuthUser, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_nbf = true;
    validation.validate_aud = false;

    let data = jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(AuthUser {
        id: data.claims.sub,
        email: data.claims.email,
    })
}

/// Device ids name directories in the device store: short, url-safe only.
pub fn is_valid_device_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DEVICE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Mint an HS256 token. Used by tests and local tooling.
pub fn sign_session_token(
    user_id: Uuid,
    email: Option<&str>,
    exp: i64,
    secret: &str,
) -> Result<String, TokenError> {
    let claims = TokenClaims {
        sub: user_id,
        email: email.map(str::to_string),
        exp,
    };

    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}
