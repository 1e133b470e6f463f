//! Catalog repository backed by Postgres. The asset payload is stored as
//! a JSONB document next to its category column and re-tagged on read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::asset::{Asset, AssetInfo};
use crate::query::sql::{sql_filter_by, sql_paginate_by, sql_sort_by, DatabaseFields};
use crate::query::{Filters, Pagination, Sorting};

use super::CatalogRepository;

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn asset_fields() -> DatabaseFields {
        // Non-text columns are filtered through their text projection so
        // the bound parameters (always text) compare cleanly.
        DatabaseFields::new([
            ("id", "assets.id::text"),
            ("category", "assets.category"),
            ("created_at", "assets.created_at::text"),
            ("updated_at", "assets.updated_at::text"),
        ])
    }
}

#[derive(FromRow)]
struct AssetRow {
    id: Uuid,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    info: serde_json::Value,
}

impl TryFrom<AssetRow> for Asset {
    type Error = AppError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            info: AssetInfo::decode(&row.category, row.info)?,
        })
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn create_asset(&self, asset: &Asset) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, category, created_at, updated_at, info)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(asset.id)
        .bind(asset.category().as_str())
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .bind(asset.info.payload()?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_asset(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_asset(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT id, category, created_at, updated_at, info FROM assets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Asset::try_from).transpose()
    }

    async fn find_assets(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Asset>> {
        let fields = Self::asset_fields();
        let filter = sql_filter_by(filters, &fields);

        let mut sql =
            String::from("SELECT id, category, created_at, updated_at, info FROM assets");
        if !filter.is_empty() {
            sql = format!("{} WHERE {}", sql, filter.clause);
        }
        if let Some(sorting) = sorting {
            let order = sql_sort_by(std::slice::from_ref(sorting), &fields);
            if !order.is_empty() {
                sql = format!("{} {}", sql, order);
            }
        }
        let page = sql_paginate_by(pagination);
        if !page.is_empty() {
            sql = format!("{} {}", sql, page);
        }

        let mut query = sqlx::query_as::<_, AssetRow>(&sql);
        for param in &filter.params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Asset::try_from).collect()
    }
}
