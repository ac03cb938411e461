//! HTTP server setup and routing
//!
//! Sets up the axum server with the REST endpoints and the SSE stream.
//! All state is dependency-injected through [`AppContext`]; handlers never
//! reach for ambient globals.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{Error, Result};
use crate::feed::PredictionFeed;
use crate::sse::Broadcaster;
use crate::store::ReportStore;

/// Shared application context passed to all handlers.
///
/// `AppContext` implements Clone, so axum's `State` extractor can hand a
/// copy to every handler.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<ReportStore>,
    pub feed: Arc<PredictionFeed>,
    pub broadcaster: Broadcaster,
    /// Proxy mode only: re-broadcast every fetched batch to the live
    /// feed, making each query visible to all connected clients
    pub rebroadcast_fetches: bool,
}

/// Build the application router with all routes.
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Prediction queries
        .route("/api/predictions", get(super::handlers::get_predictions))
        // Citizen reports
        .route("/api/reports", get(super::handlers::get_reports))
        .route("/api/reports", post(super::handlers::create_report))
        // SSE event stream
        .route("/api/events", get(super::sse::event_stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind and serve until shutdown.
pub async fn run(ctx: AppContext, port: u16) -> Result<()> {
    let app = create_router(ctx);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("riskmap server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("failed to bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Internal(format!("server error: {e}")))?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
