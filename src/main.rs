// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Artsy-Gateway API Server
//!
//! Proxies artist search and details from the Artsy API and keeps user
//! accounts with their favorite artists.

use artsy_gateway::{config::Config, db, services::ArtsyService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Artsy-Gateway API");

    let users = db::connect(&config.database)
        .await
        .expect("Failed to connect to user store");
    tracing::info!(backend = ?config.database, "User store ready");

    let artsy = ArtsyService::from_config(&config).expect("Failed to build Artsy client");
    tracing::info!(
        api = %config.artsy_api_url,
        timeout_secs = config.upstream_timeout.as_secs(),
        max_retries = config.upstream_max_retries,
        "Artsy client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        users,
        artsy,
    });

    // Build router
    let app = artsy_gateway::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("artsy_gateway=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
