//! Authentication utilities: JWT-based session issuance and validation
//! for librarians, plus password hashing and verification with bcrypt.
//!
//! Tokens are signed with HS256 using the secret configured through the
//! `AUTH_SIGNING_KEY` environment variable (cached into [`AuthConfig`] at
//! startup) and carry the standard subject, issuer, issued-at and expiry
//! claims. Sessions live four hours; validity is gated solely by the
//! expiry claim, there is no server-side revocation store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::models::user::Librarian;

const TOKEN_ISSUER: &str = "librarium";
const EXPIRY_HOURS: i64 = 4;

/// Bcrypt rejects inputs past this size.
const MAX_PASSWORD_BYTES: usize = 72;

/// Json payload the client sends to trigger the login flow.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// An auth session in the system, also the login endpoint response. The
/// token validates the interaction between server and client and carries
/// basic identity in its claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub librarian_id: Uuid,
    pub token: String,
    /// Moment when the token becomes invalid.
    pub expires_at: DateTime<Utc>,
}

/// Registered claims baked into every session token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Hash a plain password using bcrypt at the default cost.
pub fn hash_password(password: &str) -> AppResult<String> {
    if password.is_empty() {
        return Err(AppError::Validation("password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(
            "password longer than 72 bytes is not supported".to_string(),
        ));
    }

    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("error hashing password: {e}")))
}

/// Compare a plain password against its stored hash.
pub fn check_password(hashed: &str, plain: &str) -> AppResult<()> {
    match bcrypt::verify(plain, hashed) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::BadCredentials),
        Err(e) => Err(AppError::Internal(format!("error verifying password: {e}"))),
    }
}

/// Run the login flow for the provided librarian: validate the
/// credentials and mint a signed session token.
pub fn login(
    req: &LoginRequest,
    librarian: &Librarian,
    config: &AuthConfig,
) -> AppResult<Session> {
    if req.email != librarian.email || check_password(&librarian.password, &req.password).is_err() {
        return Err(AppError::BadCredentials);
    }

    if config.signing_key.is_empty() {
        return Err(AppError::Internal(
            "auth signing key is not configured".to_string(),
        ));
    }

    let now = Utc::now();
    let expires_at = now + Duration::hours(EXPIRY_HOURS);
    let claims = Claims {
        sub: librarian.id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.signing_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("error signing token: {e}")))?;

    Ok(Session {
        librarian_id: librarian.id,
        token,
        expires_at,
    })
}

/// Parse and validate a session token, returning the librarian ID held
/// in the subject claim. Expired tokens and tokens without a subject are
/// rejected.
pub fn decode_and_validate(token: &str, config: &AuthConfig) -> AppResult<Uuid> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.signing_key.as_bytes()),
        &validation,
    )
    .map_err(|e| AppError::TokenInvalid(format!("error parsing token: {e}")))?;

    Uuid::parse_str(&data.claims.sub)
        .map_err(|e| AppError::TokenInvalid(format!("error parsing token subject: {e}")))
}
