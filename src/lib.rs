//! Librarium — library management back-end
//!
//! A REST JSON API that administers a physical library's operational
//! lifecycle: onboarding librarians and customers, maintaining a
//! heterogeneous media catalog, and mediating rentals of catalog items
//! to customers over time.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod onboarding;
pub mod query;
pub mod repository;
pub mod server;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::{CatalogRepository, RentalRepository, UserRepository};

/// Application state shared across all handlers. Controllers depend only
/// on the repository contracts, so the server runs equally against the
/// Postgres and the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub rentals: Arc<dyn RentalRepository>,
    /// Base cancellation handle shared by every in-flight request. It is
    /// cancelled only at hard shutdown, so soft shutdown never aborts a
    /// request mid-operation; handlers wanting per-request deadlines can
    /// derive a child token from it.
    pub ongoing: CancellationToken,
}
