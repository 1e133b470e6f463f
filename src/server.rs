//! HTTP server: routing, middleware wiring and the serve/drain/cancel
//! lifecycle.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    middleware,
    routing::{delete, post, put},
    Router,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// How long a shutdown waits for in-flight requests to drain before the
/// base cancellation handle is cancelled.
const SHUTDOWN_PERIOD: Duration = Duration::from_secs(15);

/// Build the application router. Layer order matters: requests traverse
/// trace, then the content-type guard, then access control, then the
/// route handlers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(api::auth::signup))
        .route("/login", post(api::auth::login))
        .route(
            "/catalog/assets",
            post(api::assets::create).get(api::assets::find),
        )
        .route("/catalog/assets/:id", delete(api::assets::delete))
        .route(
            "/customers",
            post(api::customers::create).get(api::customers::find),
        )
        .route("/customers/:id/suspend", put(api::customers::suspend))
        .route("/customers/:id/unsuspend", put(api::customers::unsuspend))
        .route(
            "/rentals",
            post(api::rentals::create).get(api::rentals::find),
        )
        .route("/rentals/:id/return", put(api::rentals::return_rental))
        .route("/rentals/:id/extend", put(api::rentals::extend))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::require_auth,
        ))
        .layer(middleware::from_fn(api::middleware::json_content_type))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A running HTTP server. Serving happens on a dedicated task; the
/// structure only keeps what shutdown needs.
pub struct Server {
    handle: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
    ongoing: CancellationToken,
}

impl Server {
    /// Bind the configured address and start serving on a dedicated
    /// task, returning immediately. A Go-style `:8080` address binds on
    /// all interfaces.
    pub async fn listen_and_serve(address: &str, state: AppState) -> AppResult<Server> {
        if address.is_empty() {
            return Err(AppError::Validation(
                "http server address is mandatory".to_string(),
            ));
        }

        let normalized = if address.starts_with(':') {
            format!("0.0.0.0{address}")
        } else {
            address.to_string()
        };
        let addr: SocketAddr = normalized
            .parse()
            .map_err(|e| AppError::Internal(format!("invalid listen address {normalized}: {e}")))?;

        let ongoing = state.ongoing.clone();
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal(format!("error binding {addr}: {e}")))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!("server error: {e}");
            }
        });

        tracing::info!("server listening on {addr}");
        Ok(Server {
            handle,
            shutdown_tx,
            ongoing,
        })
    }

    /// Stop accepting connections and wait up to the shutdown period for
    /// in-flight requests to drain, then cancel the base handle shared
    /// by all requests. A drain timeout is reported as an error; the
    /// cancellation happens either way.
    pub async fn shutdown(self) -> AppResult<()> {
        let Server {
            handle,
            shutdown_tx,
            ongoing,
        } = self;

        let _ = shutdown_tx.send(());
        let drained = tokio::time::timeout(SHUTDOWN_PERIOD, handle).await;
        ongoing.cancel();

        match drained {
            Ok(_) => Ok(()),
            Err(_) => Err(AppError::Internal(
                "timed out waiting for in-flight requests to finish".to_string(),
            )),
        }
    }
}
