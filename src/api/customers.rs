//! Customer endpoints.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::user::Customer;
use crate::onboarding::{self, CustomerRequest};
use crate::query::http::{filters_from_query, pagination_from_query, sorting_from_query};
use crate::AppState;

use super::{decode_request, parse_id, IdResponse};

/// Register a new customer into the platform.
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<IdResponse>)> {
    let req: CustomerRequest = decode_request(&body)?;

    let customer = onboarding::onboard_customer(&req)?;
    state.users.create_customer(&customer).await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id: customer.id })))
}

/// List customers, shaped by the query-string filters, sorting and
/// pagination.
pub async fn find(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Vec<Customer>>> {
    let query = query.unwrap_or_default();
    let pagination = pagination_from_query(&query)?;
    let sorting = sorting_from_query(&query);
    let filters = filters_from_query(&query);

    let customers = state
        .users
        .find_customers(&filters, Some(&sorting), Some(&pagination))
        .await?;

    Ok(Json(customers))
}

/// Block a customer from renting.
pub async fn suspend(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "customer")?;

    let mut customer = state
        .users
        .get_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;

    customer.suspend()?;
    state.users.update_customer(&customer).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lift a customer suspension.
pub async fn unsuspend(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "customer")?;

    let mut customer = state
        .users
        .get_customer(id)
        .await?
        .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;

    customer.unsuspend()?;
    state.users.update_customer(&customer).await?;

    Ok(StatusCode::NO_CONTENT)
}
