//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::ServerError;
use crate::server::handlers::{
    get_status_handler, health_handler, put_status_handler, rollout_handler, version_handler,
};
use crate::server::state::ServerState;

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Rollouts
        .route(
            "/api/v1/rollout/{stage}/{namespace}/{deployment}",
            put(rollout_handler),
        )
        // Status
        .route(
            "/api/v1/deployments/{stage}/{namespace}/{deployment}/status",
            get(get_status_handler).put(put_status_handler),
        )
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), ServerError>>, ServerError> {
    let app = router(state);

    info!("Starting HTTP server on {}", options.bind_address);

    let listener = TcpListener::bind(&options.bind_address)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServerError(e.to_string()))
    });

    Ok(handle)
}
