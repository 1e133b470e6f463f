//! Rental endpoints.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::rental::{Rental, RentalRequest};
use crate::query::http::{filters_from_query, pagination_from_query, sorting_from_query};
use crate::query::{Filter, Filters};
use crate::AppState;

use super::{decode_request, parse_id, IdResponse};

/// Rent a catalog asset for a customer, enforcing the admission rules
/// over the customer's current rentals.
pub async fn create(State(state): State<AppState>, body: Bytes) -> AppResult<Json<IdResponse>> {
    let req: RentalRequest = decode_request(&body)?;

    let customer = state
        .users
        .get_customer(req.customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;
    let asset = state
        .catalog
        .get_asset(req.asset_id)
        .await?
        .ok_or_else(|| AppError::NotFound("asset not found".to_string()))?;

    let active_rental = state
        .rentals
        .get_active_rental(customer.id, asset.id)
        .await?;

    let mut filters = Filters::new();
    filters.insert(
        "customer_id".to_string(),
        Filter::Equal(customer.id.to_string()),
    );
    let customer_rentals = state.rentals.find_rentals(&filters, None, None).await?;

    let rental = Rental::rent(&customer, &asset, active_rental.as_ref(), &customer_rentals)?;
    state.rentals.create_rental(&rental).await?;

    Ok(Json(IdResponse { id: rental.id }))
}

/// List rentals, shaped by the query-string filters, sorting and
/// pagination.
pub async fn find(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Vec<Rental>>> {
    let query = query.unwrap_or_default();
    let pagination = pagination_from_query(&query)?;
    let sorting = sorting_from_query(&query);
    let filters = filters_from_query(&query);

    let rentals = state
        .rentals
        .find_rentals(&filters, Some(&sorting), Some(&pagination))
        .await?;

    Ok(Json(rentals))
}

/// Close a rental by returning the rented asset.
pub async fn return_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "rental")?;

    let mut rental = state
        .rentals
        .get_rental(id)
        .await?
        .ok_or_else(|| AppError::NotFound("rental not found".to_string()))?;

    rental.mark_returned()?;
    state.rentals.update_rental(&rental).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Expand the rental period by one month.
pub async fn extend(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "rental")?;

    let mut rental = state
        .rentals
        .get_rental(id)
        .await?
        .ok_or_else(|| AppError::NotFound("rental not found".to_string()))?;

    rental.extend()?;
    state.rentals.update_rental(&rental).await?;

    Ok(StatusCode::NO_CONTENT)
}
