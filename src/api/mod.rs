//! API handlers for the librarium REST endpoints, one module per
//! resource, plus the middlewares and the small request/response helpers
//! every controller shares.

pub mod assets;
pub mod auth;
pub mod customers;
pub mod middleware;
pub mod rentals;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Response body for mutations that answer with the created entity ID.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
}

/// Decode a JSON request body into the requested shape. An empty body and
/// malformed JSON both reject the request.
pub(crate) fn decode_request<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    if body.is_empty() {
        return Err(AppError::Validation("empty request body".to_string()));
    }

    serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))
}

/// Parse a path segment as a UUID, naming the resource in the rejection.
pub(crate) fn parse_id(raw: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        AppError::Validation(format!("invalid {resource} ID format, expected UUID"))
    })
}
