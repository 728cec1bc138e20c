//! HTTP server initialization and runtime setup.
//!
//! Wires the upstream client factory, the aggregation service and the Axum
//! server lifecycle together.

use crate::application::services::ClicksService;
use crate::config::Config;
use crate::domain::pipeline::worker_pool;
use crate::infrastructure::bitly::BitlyClientFactory;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Shared upstream HTTP client
/// - Aggregation service
/// - Worker counter descriptions (for whichever `metrics` recorder the binary installs)
/// - Axum HTTP server, stopped gracefully on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - The upstream base URL is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let factory = BitlyClientFactory::new(&config.api_base_url, config.upstream_timeout())
        .context("Failed to initialize upstream API client")?;
    tracing::info!("Upstream API: {}", factory.base_url());

    worker_pool::describe_metrics();

    let service = ClicksService::new(Arc::new(factory), config.clicks_settings());
    let state = AppState::new(Arc::new(service));

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
