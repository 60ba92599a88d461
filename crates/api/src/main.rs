//! OpsBoard - operations dashboard backend
//!
//! Main entry point: loads configuration, wires the application context,
//! and serves until interrupted.

use std::sync::Arc;

use opsboard_lib::AppContext;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env before reading config
    let dotenv = dotenvy::dotenv();

    let config = opsboard_infra::config::load()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    tracing::info!("OpsBoard starting...");
    let ctx = Arc::new(AppContext::with_config(config)?);

    let health = ctx.health_check().await;
    tracing::info!(score = health.score, healthy = health.is_healthy, "startup health check");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    ctx.shutdown().await;
    Ok(())
}
