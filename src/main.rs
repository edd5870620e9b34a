mod config;
mod error;
mod extract;
mod models;
mod openrouter;
mod prompt;
mod routes;
mod validation;

use anyhow::Context;
use routes::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{config::Config, error::prefix_chars, openrouter::OpenRouterClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    match &config.api_key {
        Some(key) => tracing::info!("Using API key: {}...", prefix_chars(key, 6)),
        None => tracing::warn!("OPENROUTER_API_KEY is not set; generation and model routes will answer 500"),
    }

    let client = OpenRouterClient::new(&config).context("building OpenRouter HTTP client")?;
    let state = AppState { backend: Arc::new(client) };
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, upstream = %config.api_base, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
