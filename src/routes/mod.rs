// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod whoop;

use crate::middleware::auth::require_api_key;
use crate::AppState;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub build_id: String,
    pub endpoints: EndpointIndex,
}

#[derive(Serialize)]
pub struct EndpointIndex {
    pub auth: &'static str,
    pub whoop: &'static str,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok",
        service: "WHOOP Gateway",
        build_id,
        endpoints: EndpointIndex {
            auth: "/auth/start, /auth/callback, /auth/status",
            whoop: "/whoop/sleep/latest, /whoop/recovery/latest, /whoop/summary/today, /whoop/report/weekly",
        },
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (OAuth flow and health)
    let public_routes = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .merge(auth::routes());

    // WHOOP data routes (internal API key required)
    let protected_routes = whoop::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_api_key,
    ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
