//! Rentals repository backed by Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::rental::{Rental, RentalStatus};
use crate::query::sql::{sql_filter_by, sql_paginate_by, sql_sort_by, DatabaseFields};
use crate::query::{Filters, Pagination, Sorting};

use super::RentalRepository;

#[derive(Clone)]
pub struct PgRentalRepository {
    pool: PgPool,
}

impl PgRentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn rental_fields() -> DatabaseFields {
        // Non-text columns are filtered through their text projection so
        // the bound parameters (always text) compare cleanly.
        DatabaseFields::new([
            ("id", "rentals.id::text"),
            ("customer_id", "rentals.customer_id::text"),
            ("asset_id", "rentals.asset_id::text"),
            ("status", "rentals.status"),
            ("rented_at", "rentals.rented_at::text"),
            ("due_at", "rentals.due_at::text"),
        ])
    }
}

#[derive(FromRow)]
struct RentalRow {
    id: Uuid,
    customer_id: Uuid,
    asset_id: Uuid,
    rented_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
    status: String,
}

impl TryFrom<RentalRow> for Rental {
    type Error = AppError;

    fn try_from(row: RentalRow) -> Result<Self, Self::Error> {
        Ok(Rental {
            id: row.id,
            customer_id: row.customer_id,
            asset_id: row.asset_id,
            rented_at: row.rented_at,
            due_at: row.due_at,
            returned_at: row.returned_at,
            status: row.status.parse()?,
        })
    }
}

#[async_trait]
impl RentalRepository for PgRentalRepository {
    async fn create_rental(&self, rental: &Rental) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rentals (id, customer_id, asset_id, rented_at, due_at, returned_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(rental.id)
        .bind(rental.customer_id)
        .bind(rental.asset_id)
        .bind(rental.rented_at)
        .bind(rental.due_at)
        .bind(rental.returned_at)
        .bind(rental.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_rental(&self, rental: &Rental) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE rentals
            SET due_at = $2, returned_at = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(rental.id)
        .bind(rental.due_at)
        .bind(rental.returned_at)
        .bind(rental.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_rental(&self, id: Uuid) -> AppResult<Option<Rental>> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, customer_id, asset_id, rented_at, due_at, returned_at, status
            FROM rentals WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Rental::try_from).transpose()
    }

    async fn get_active_rental(
        &self,
        customer_id: Uuid,
        asset_id: Uuid,
    ) -> AppResult<Option<Rental>> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT id, customer_id, asset_id, rented_at, due_at, returned_at, status
            FROM rentals
            WHERE customer_id = $1 AND asset_id = $2 AND status = $3
            "#,
        )
        .bind(customer_id)
        .bind(asset_id)
        .bind(RentalStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Rental::try_from).transpose()
    }

    async fn find_rentals(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Rental>> {
        let fields = Self::rental_fields();
        let filter = sql_filter_by(filters, &fields);

        let mut sql = String::from(
            "SELECT id, customer_id, asset_id, rented_at, due_at, returned_at, status FROM rentals",
        );
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

        let mut query = sqlx::query_as::<_, RentalRow>(&sql);
        for param in &filter.params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Rental::try_from).collect()
    }
}
