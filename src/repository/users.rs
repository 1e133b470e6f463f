//! Users repository backed by Postgres.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::user::{Customer, Librarian};
use crate::query::sql::{sql_filter_by, sql_paginate_by, sql_sort_by, DatabaseFields};
use crate::query::{Filters, Pagination, Sorting};

use super::UserRepository;

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn customer_fields() -> DatabaseFields {
        // Non-text columns are filtered through their text projection so
        // the bound parameters (always text) compare cleanly.
        DatabaseFields::new([
            ("id", "customers.id::text"),
            ("name", "customers.name"),
            ("last_name", "customers.last_name"),
            ("national_id", "customers.national_id"),
            ("status", "customers.status"),
        ])
    }
}

/// Flat customer row; the contact details travel as a JSONB document.
#[derive(FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    last_name: String,
    national_id: String,
    status: String,
    contact_details: serde_json::Value,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = AppError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: row.id,
            name: row.name,
            last_name: row.last_name,
            national_id: row.national_id,
            status: row.status.parse()?,
            contact_details: serde_json::from_value(row.contact_details)
                .map_err(|e| AppError::Internal(format!("error decoding contact details: {e}")))?,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_librarian(&self, librarian: &Librarian) -> AppResult<()> {
        sqlx::query("INSERT INTO librarians (id, name, email, password) VALUES ($1, $2, $3, $4)")
            .bind(librarian.id)
            .bind(&librarian.name)
            .bind(&librarian.email)
            .bind(&librarian.password)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_librarian_by_email(&self, email: &str) -> AppResult<Option<Librarian>> {
        let librarian = sqlx::query_as::<_, Librarian>(
            "SELECT id, name, email, password FROM librarians WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(librarian)
    }

    async fn create_customer(&self, customer: &Customer) -> AppResult<()> {
        let contact_details = serde_json::to_value(&customer.contact_details)
            .map_err(|e| AppError::Internal(format!("error encoding contact details: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, last_name, national_id, status, contact_details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.last_name)
        .bind(&customer.national_id)
        .bind(customer.status.as_str())
        .bind(contact_details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> AppResult<()> {
        let contact_details = serde_json::to_value(&customer.contact_details)
            .map_err(|e| AppError::Internal(format!("error encoding contact details: {e}")))?;

        sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, last_name = $3, national_id = $4, status = $5, contact_details = $6
            WHERE id = $1
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.last_name)
        .bind(&customer.national_id)
        .bind(customer.status.as_str())
        .bind(contact_details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, last_name, national_id, status, contact_details
            FROM customers WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    async fn find_customers(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Customer>> {
        let fields = Self::customer_fields();
        let filter = sql_filter_by(filters, &fields);

        let mut sql = String::from(
            "SELECT id, name, last_name, national_id, status, contact_details FROM customers",
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

        let mut query = sqlx::query_as::<_, CustomerRow>(&sql);
        for param in &filter.params {
            query = query.bind(param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Customer::try_from).collect()
    }
}
