use anyhow::Context as _;
use axum::http::HeaderName;
use reloader_core::PipelineEngine;
use reloader_runner::CliRuntime;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod auth;
pub mod config;

use api::AppState;
use auth::Authenticator;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Reloader...");

    let runtime = CliRuntime::new(&config.runtime.binary);
    runtime
        .check_available()
        .await
        .with_context(|| format!("Container runtime {} is not available", runtime.binary()))?;

    let header = HeaderName::try_from(config.auth.header.as_str())
        .context("Invalid authentication header name")?;
    let auth = Authenticator::new(header, config.auth.api_key.clone());
    tracing::info!("Expecting tokens in the {} header", auth.header());

    let state = AppState {
        engine: PipelineEngine::start(config.server.queue_capacity),
        runtime: Arc::new(runtime),
        plan: Arc::new(config.deployment_plan()),
        auth: Arc::new(auth),
        image_prefix: config.filter.image_prefix.as_deref().map(Arc::from),
    };

    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Reloader stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
