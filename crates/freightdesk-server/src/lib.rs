//! HTTP surface for the call/deal ledger and the metrics snapshot.
//!
//! Handlers are thin: they decode the request, hand the work to the store on
//! the blocking pool, and map the result onto a status code.

pub mod auth;
pub mod error;
pub mod routes;

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::middleware;
use axum::routing::get;
use axum::Router;
use freightdesk_store::catalog::ShipmentCatalog;
use freightdesk_store::error::StoreError;
use freightdesk_store::Store;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::auth::{require_api_key, ApiKey};
use crate::error::ApiError;

/// Shared state for all handlers. The store sits behind a mutex because a
/// SQLite connection is not `Sync`; every access happens on the blocking pool.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
    catalog: Arc<ShipmentCatalog>,
    api_key: ApiKey,
}

impl AppState {
    pub fn new(store: Store, catalog: ShipmentCatalog, api_key: Option<String>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            catalog: Arc::new(catalog),
            api_key: ApiKey::new(api_key),
        }
    }

    /// Returns the store once no handler holds a reference to it anymore.
    pub fn into_store(self) -> Option<Store> {
        Arc::try_unwrap(self.store)
            .ok()
            .and_then(|mutex| mutex.into_inner().ok())
    }

    pub(crate) async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
            f(&guard).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
    }

    pub(crate) async fn with_catalog<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&ShipmentCatalog) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        tokio::task::spawn_blocking(move || f(&catalog).map_err(ApiError::from))
            .await
            .map_err(|err| ApiError::Internal(format!("catalog task failed: {err}")))?
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route(
            "/api/calls",
            get(routes::calls::list_calls).post(routes::calls::create_call),
        )
        .route(
            "/api/calls/{id}",
            get(routes::calls::get_call)
                .put(routes::calls::update_call)
                .delete(routes::calls::delete_call),
        )
        .route(
            "/api/deals",
            get(routes::deals::list_deals).post(routes::deals::create_deal),
        )
        .route(
            "/api/deals/{id}",
            get(routes::deals::get_deal)
                .put(routes::deals::update_deal)
                .delete(routes::deals::delete_deal),
        )
        .route("/api/metrics", get(routes::metrics::get_metrics))
        .route("/api/data", get(routes::metrics::get_data))
        .route("/data", get(routes::metrics::get_data))
        .layer(middleware::from_fn_with_state(
            state.api_key.clone(),
            require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` resolves, then waits for in-flight requests.
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("freightdesk API listening on http://{addr}");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
