//! HTTP API for the position hierarchy
//!
//! This module exposes `PositionService` as a REST API for the single-page
//! frontend.
//!
//! # Architecture
//!
//! - `position_endpoints`: position CRUD, hierarchy and delete policies
//! - `http_error`: `{message, code, details?}` error bodies
//!
//! # Security
//!
//! - CORS restricted to the configured origins
//! - No authentication

use axum::{
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use orgchart_core::PositionService;

mod http_error;
mod position_endpoints;

pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// Writes are serialized inside `PositionService`, so handlers never lock.
#[derive(Clone)]
pub struct AppState {
    pub positions: Arc<PositionService>,
}

impl AppState {
    pub fn new(positions: PositionService) -> Self {
        Self {
            positions: Arc::new(positions),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// ```bash
/// curl http://localhost:5063/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the application router with all endpoint modules
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(position_endpoints::routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS layer allowing the given origins
///
/// # Errors
///
/// Returns error if an origin is not a valid header value.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<anyhow::Result<Vec<HeaderValue>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
        .allow_credentials(false))
}

/// Start the HTTP server and run until Ctrl-C
///
/// # Errors
///
/// Returns error if the server fails to bind or start.
pub async fn start_server(config: &ServerConfig, positions: PositionService) -> anyhow::Result<()> {
    let app = create_router(AppState::new(positions), cors_layer(&config.cors_origins)?);

    let addr = config.socket_addr();
    tracing::info!("🚀 OrgChart server starting on http://{}", addr);
    tracing::info!("📡 CORS enabled for {}", config.cors_origins.join(", "));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
