//! Router construction and server entry point

use crate::config::ServerConfig;
use crate::server::{routes, sse};
use crate::state::AppState;
use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

/// Build the Axum application
pub fn build_app(config: ServerConfig) -> Router {
    let state = AppState::new(config);
    build_app_with_state(state)
}

/// Build the application around existing state (used by tests)
pub fn build_app_with_state(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/stats", get(routes::stats))
        // Same path the original demo exposes: POST to ingest, GET to stream
        .route("/events", get(sse::stream_events).post(routes::ingest));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Run the server until the process is stopped
pub async fn run_server(config: ServerConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_app(config);

    tracing::info!("starting PulseMap event server on {}", addr);
    tracing::info!("ingest:  POST http://{}/api/events", addr);
    tracing::info!("stream:  GET  http://{}/api/events", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
