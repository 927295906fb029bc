// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP Gateway API Server
//!
//! Keeps a single user's WHOOP authorization alive and serves simplified
//! health endpoints to an assistant.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whoop_gateway::{config::Config, db::CredentialStore, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting WHOOP Gateway");

    // Credential file survives restarts (mount a volume at DATA_DIR in production)
    let token_path = config.token_path();
    tracing::info!(path = %token_path.display(), "Using credential file");
    let store = CredentialStore::file(token_path);

    match store.load() {
        Some(credential) => tracing::info!(
            expires_at = %credential.expires_at,
            "Found stored WHOOP credential"
        ),
        None => tracing::warn!("No WHOOP credential stored, visit /auth/start"),
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store)?);

    // Build router
    let app = whoop_gateway::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("whoop_gateway=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
