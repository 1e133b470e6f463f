//! Application lifecycle: wiring of the Postgres repositories into the
//! shared state, signal handling and the ordered shutdown sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::repository::{PgCatalogRepository, PgRentalRepository, PgUserRepository};
use crate::server::Server;
use crate::AppState;

/// Extra wait after any shutdown step times out.
const SHUTDOWN_HARD_PERIOD: Duration = Duration::from_secs(3);
/// Time given to external readiness checks to observe the flipped flag
/// before requests stop being served.
const READINESS_DRAIN_DELAY: Duration = Duration::from_secs(5);
/// How long closing the storage connection may take.
const STORAGE_CLOSE_PERIOD: Duration = Duration::from_secs(15);

/// The librarium application: configuration, storage and the HTTP
/// server, with a graceful shutdown tied to process signals.
pub struct Application {
    config: Arc<AppConfig>,
    pool: PgPool,
    state: AppState,
    is_shutting_down: Arc<AtomicBool>,
}

impl Application {
    /// Wire the application over an established connection pool.
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
            rentals: Arc::new(PgRentalRepository::new(pool.clone())),
            ongoing: CancellationToken::new(),
        };

        Self {
            config,
            pool,
            state,
            is_shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the application received a shutdown signal. Readiness
    /// probes must fail once this flips.
    pub fn is_shutting_down(&self) -> bool {
        self.is_shutting_down.load(Ordering::Relaxed)
    }

    /// Handle to the shutdown flag, for wiring into an external
    /// readiness check before [`run`](Self::run) consumes the
    /// application.
    pub fn readiness_flag(&self) -> Arc<AtomicBool> {
        self.is_shutting_down.clone()
    }

    /// Serve until a shutdown signal arrives, then run the ordered
    /// shutdown sequence: flip the readiness flag, let external checks
    /// drain, stop the server, close the storage connection. Any step
    /// timing out earns an extra hard-period wait.
    pub async fn run(self) -> anyhow::Result<()> {
        let server = Server::listen_and_serve(&self.config.server.address, self.state.clone()).await?;

        shutdown_signal().await;
        self.is_shutting_down.store(true, Ordering::Relaxed);
        tracing::info!("received shutdown signal, shutting down");

        tokio::time::sleep(READINESS_DRAIN_DELAY).await;
        tracing::info!("readiness drain elapsed, waiting for ongoing requests to finish");

        if let Err(e) = server.shutdown().await {
            tracing::warn!("failed to wait for ongoing requests to finish ({e}), waiting for forced cancellation");
            tokio::time::sleep(SHUTDOWN_HARD_PERIOD).await;
        }

        if tokio::time::timeout(STORAGE_CLOSE_PERIOD, self.pool.close())
            .await
            .is_err()
        {
            tracing::warn!("failed to wait for ongoing database work to finish, waiting for forced cancellation");
            tokio::time::sleep(SHUTDOWN_HARD_PERIOD).await;
        }

        tracing::info!("application shut down gracefully");
        Ok(())
    }
}

/// Resolve when the process receives an interrupt or terminate signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install interrupt signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install terminate signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
