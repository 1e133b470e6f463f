//! Catalog asset endpoints.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::asset::{Asset, AssetInfo};
use crate::query::http::{filters_from_query, pagination_from_query, sorting_from_query};
use crate::AppState;

use super::{decode_request, parse_id, IdResponse};

/// Add a new asset to the catalog. The payload shape is selected by its
/// `category` tag; unknown categories are rejected at decode time.
pub async fn create(State(state): State<AppState>, body: Bytes) -> AppResult<Json<IdResponse>> {
    let info: AssetInfo = decode_request(&body)?;

    let asset = Asset::build(info);
    state.catalog.create_asset(&asset).await?;

    Ok(Json(IdResponse { id: asset.id }))
}

/// Remove an asset from the catalog.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, "asset")?;

    state
        .catalog
        .get_asset(id)
        .await?
        .ok_or_else(|| AppError::NotFound("asset not found".to_string()))?;

    state.catalog.delete_asset(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List catalog assets, shaped by the query-string filters, sorting and
/// pagination.
pub async fn find(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Vec<Asset>>> {
    let query = query.unwrap_or_default();
    let pagination = pagination_from_query(&query)?;
    let sorting = sorting_from_query(&query);
    let filters = filters_from_query(&query);

    let assets = state
        .catalog
        .find_assets(&filters, Some(&sorting), Some(&pagination))
        .await?;

    Ok(Json(assets))
}
