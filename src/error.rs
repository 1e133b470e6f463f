//! Error types for the librarium server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application error type.
///
/// Variants are error *kinds*: every failure in the system is classified
/// into one of them and carries the human-readable message rendered to the
/// client. The HTTP mapping lives in the [`IntoResponse`] impl so handlers
/// and domain code never deal with status codes directly.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input: missing field, bad JSON, bad UUID, wrong content type.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials on a protected route.
    #[error("unauthorized")]
    Unauthorized,

    /// Email/password pair rejected at login.
    #[error("login bad credentials")]
    BadCredentials,

    /// JWT rejected: expired, malformed or missing claims.
    #[error("{0}")]
    TokenInvalid(String),

    /// Entity absent.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (e.g. duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// A state-machine rule rejected the transition.
    #[error("{0}")]
    DomainRule(String),

    /// Underlying store failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Unexpected condition (e.g. token signing failure).
    #[error("{0}")]
    Internal(String),
}

/// Error response body, the single envelope used for every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::BadCredentials => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::TokenInvalid(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::DomainRule(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                // Internal details must not leak to the client.
                tracing::error!(error = ?e, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unexpected storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for application operations.
pub type AppResult<T> = Result<T, AppError>;
