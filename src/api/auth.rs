//! Authentication endpoints: librarian signup and login.

use axum::{body::Bytes, extract::State, Json};

use crate::auth::{self, LoginRequest, Session};
use crate::error::{AppError, AppResult};
use crate::onboarding::{self, LibrarianRequest};
use crate::AppState;

use super::{decode_request, IdResponse};

/// Authenticate a librarian and open a session.
pub async fn login(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Session>> {
    let req: LoginRequest = decode_request(&body)?;

    let librarian = state
        .users
        .get_librarian_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("librarian not found".to_string()))?;

    let session = auth::login(&req, &librarian, &state.config.auth)?;
    Ok(Json(session))
}

/// Register a new librarian. The email is unique across the system.
pub async fn signup(State(state): State<AppState>, body: Bytes) -> AppResult<Json<IdResponse>> {
    let req: LibrarianRequest = decode_request(&body)?;

    if state
        .users
        .get_librarian_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    let librarian = onboarding::onboard_librarian(&req)?;
    state.users.create_librarian(&librarian).await?;

    Ok(Json(IdResponse { id: librarian.id }))
}
