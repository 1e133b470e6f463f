//! Repository layer: the narrow persistence surfaces the controllers
//! depend on, with a Postgres implementation for production and an
//! in-memory implementation for tests and local wiring.
//!
//! Lookups that succeed but find nothing return `Ok(None)` (or an empty
//! vector); errors are reserved for storage failures.

pub mod catalog;
pub mod memory;
pub mod rentals;
pub mod users;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::asset::Asset;
use crate::models::rental::Rental;
use crate::models::user::{Customer, Librarian};
use crate::query::{Filters, Pagination, Sorting};

pub use catalog::PgCatalogRepository;
pub use rentals::PgRentalRepository;
pub use users::PgUserRepository;

/// Interactions between the user domain and the persistence layer.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the provided librarian into the store.
    async fn create_librarian(&self, librarian: &Librarian) -> AppResult<()>;

    /// Retrieve the librarian linked to the provided email, if any.
    async fn get_librarian_by_email(&self, email: &str) -> AppResult<Option<Librarian>>;

    /// Insert the provided customer into the store.
    async fn create_customer(&self, customer: &Customer) -> AppResult<()>;

    /// Persist the provided customer data over the stored customer.
    async fn update_customer(&self, customer: &Customer) -> AppResult<()>;

    /// Retrieve the customer linked to the provided ID, if any.
    async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>>;

    /// Retrieve the customers matching the provided query options.
    async fn find_customers(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Customer>>;
}

/// Interactions between the catalog domain and the persistence layer.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert the provided asset into the store.
    async fn create_asset(&self, asset: &Asset) -> AppResult<()>;

    /// Remove the asset linked to the given ID from the catalog.
    async fn delete_asset(&self, id: Uuid) -> AppResult<()>;

    /// Retrieve the asset linked to the given ID, if any.
    async fn get_asset(&self, id: Uuid) -> AppResult<Option<Asset>>;

    /// Retrieve the assets matching the provided query options.
    async fn find_assets(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Asset>>;
}

/// Interactions between the rental domain and the persistence layer.
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// Insert the provided rental into the store.
    async fn create_rental(&self, rental: &Rental) -> AppResult<()>;

    /// Persist the provided rental data over the stored rental.
    async fn update_rental(&self, rental: &Rental) -> AppResult<()>;

    /// Retrieve the rental linked to the provided ID, if any.
    async fn get_rental(&self, id: Uuid) -> AppResult<Option<Rental>>;

    /// Retrieve the active rental matching the provided customer and
    /// asset, if any.
    async fn get_active_rental(
        &self,
        customer_id: Uuid,
        asset_id: Uuid,
    ) -> AppResult<Option<Rental>>;

    /// Retrieve the rentals matching the provided query options.
    async fn find_rentals(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Rental>>;
}
