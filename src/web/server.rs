use crate::config::ServerConfig;
use crate::ingest::Ingestor;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::api::{health_check, ingest, latest, method_not_allowed, AppState};

pub const HEALTH_ROUTE: &str = "/health";

/// Build the logger router with the ingest and latest routes mounted at the
/// configured paths.
pub fn build_router(ingestor: Arc<Ingestor>, server: &ServerConfig) -> Router {
    // Batches can be far larger than axum's 2 MiB default
    let body_limit = match server.max_body_bytes {
        0 => DefaultBodyLimit::disable(),
        max => DefaultBodyLimit::max(max),
    };

    Router::new()
        .route(
            &server.ingest_route,
            post(ingest).fallback(method_not_allowed),
        )
        .route(
            &server.latest_route,
            get(latest).fallback(method_not_allowed),
        )
        .route(HEALTH_ROUTE, get(health_check))
        .with_state(AppState { ingestor })
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listen_addr` until `shutdown` resolves.
pub async fn start_server(
    listen_addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
