//! Request middlewares: JSON content-type enforcement and JWT-based
//! access control.

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth;
use crate::error::AppError;
use crate::AppState;

/// Requests that carry a body must declare the JSON content type; other
/// methods pass through regardless.
pub async fn json_content_type(req: Request, next: Next) -> Response {
    if req.method() == Method::POST || req.method() == Method::PUT {
        let media_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .unwrap_or_default();

        if media_type != "application/json" {
            return AppError::Validation("Content-Type must be application/json".to_string())
                .into_response();
        }
    }

    next.run(req).await
}

/// Every path except the signup and login whitelist requires an
/// `Authorization` header holding a valid session token.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if path == "/signup" || path == "/login" {
        return next.run(req).await;
    }

    let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return AppError::Unauthorized.into_response();
    };

    if let Err(e) = auth::decode_and_validate(token, &state.config.auth) {
        tracing::debug!("rejected token: {e}");
        return AppError::Unauthorized.into_response();
    }

    next.run(req).await
}
