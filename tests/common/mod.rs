// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{Duration, Utc};
use std::sync::Arc;
use whoop_gateway::config::Config;
use whoop_gateway::db::CredentialStore;
use whoop_gateway::models::Credential;
use whoop_gateway::routes::create_router;
use whoop_gateway::AppState;
use wiremock::MockServer;

/// Token endpoint path on the mock server.
#[allow(dead_code)]
pub const TOKEN_PATH: &str = "/oauth/oauth2/token";

/// API key accepted by the test router.
#[allow(dead_code)]
pub const API_KEY: &str = "test_api_key";

/// A mock WHOOP server plus app state wired against it.
#[allow(dead_code)]
pub struct TestApp {
    pub server: MockServer,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    /// Start a mock WHOOP server with an empty in-memory credential store.
    pub async fn start() -> Self {
        Self::start_with(|config| config).await
    }

    /// Like [`TestApp::start`], with a chance to adjust the config first.
    pub async fn start_with(adjust: impl FnOnce(Config) -> Config) -> Self {
        let server = MockServer::start().await;
        let config = adjust(Config::test_default().with_upstream(&server.uri()));
        let state = Arc::new(
            AppState::new(config, CredentialStore::in_memory()).expect("Failed to build state"),
        );
        Self { server, state }
    }

    pub fn store(&self) -> &CredentialStore {
        self.state.store()
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    /// Store a credential valid for another hour.
    pub fn seed_valid(&self, access: &str, refresh: &str) -> Credential {
        self.store()
            .save(access, refresh, 3600)
            .expect("Failed to seed credential")
    }

    /// Store a credential that expired an hour ago.
    pub fn seed_expired(&self, access: &str, refresh: &str) -> Credential {
        self.store()
            .save_at(access, refresh, 3600, Utc::now() - Duration::hours(2))
            .expect("Failed to seed credential")
    }
}

/// Full mock-server path for a WHOOP API endpoint.
#[allow(dead_code)]
pub fn api(path: &str) -> String {
    format!("/developer/v2{}", path)
}

/// Token endpoint success body.
#[allow(dead_code)]
pub fn token_body(access: &str, refresh: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
        "scope": "offline read:sleep",
        "token_type": "bearer"
    })
}
