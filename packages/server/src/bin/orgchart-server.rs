//! OrgChart HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 5063, default DB path)
//! cargo run --bin orgchart-server
//!
//! # Custom port and database
//! ORGCHART_PORT=8080 ORGCHART_DB_PATH=/tmp/org.db cargo run --bin orgchart-server
//! ```
//!
//! # Environment Variables
//!
//! - `ORGCHART_DB_PATH`, `ORGCHART_HOST`, `ORGCHART_PORT`, `CORS_ALLOW_ORIGIN`:
//!   see [`orgchart_server::ServerConfig`]
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::sync::Arc;

use anyhow::Context;
use orgchart_core::db::{DatabaseService, TursoStore};
use orgchart_core::PositionService;
use orgchart_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚀 OrgChart Server");
    tracing::info!("==================================");

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    tracing::info!("📡 Listening address: {}", config.socket_addr());
    tracing::info!("📦 Database: {}", config.db_path.display());

    let db = DatabaseService::new(config.db_path.clone())
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    let store = Arc::new(TursoStore::new(Arc::new(db)));
    let positions = PositionService::new(store);

    match positions.check_integrity().await {
        Ok(report) if report.healthy => tracing::info!("✅ Hierarchy integrity check passed"),
        Ok(report) => tracing::warn!(
            "⚠️  Hierarchy has {} dangling and {} unreachable position(s)",
            report.dangling.len(),
            report.unreachable.len()
        ),
        Err(e) => tracing::warn!("⚠️  Hierarchy integrity check failed: {}", e),
    }

    orgchart_server::api::start_server(&config, positions).await?;

    Ok(())
}
