// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP API client.
//!
//! Handles:
//! - Bearer-authenticated GETs against the v2 developer API
//! - Authorization-code and refresh-token grants
//! - Mapping upstream failures to [`AppError::WhoopApi`]
//!
//! This layer knows nothing about stored credentials; see
//! [`AuthenticatedFetcher`](crate::services::AuthenticatedFetcher).

use crate::config::Config;
use crate::error::AppError;
use crate::models::credential::expiry_after;
use crate::models::TokenResponse;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Scopes requested during authorization.
pub const SCOPES: &str = "offline read:recovery read:sleep read:workout read:cycles read:profile";

/// WHOOP API client.
#[derive(Clone)]
pub struct WhoopClient {
    http: reqwest::Client,
    api_base: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl WhoopClient {
    /// Create a client with the configured endpoints, credentials and timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.whoop_api_base.trim_end_matches('/').to_string(),
            token_url: config.whoop_token_url.clone(),
            client_id: config.whoop_client_id.clone(),
            client_secret: config.whoop_client_secret.clone(),
            redirect_uri: config.whoop_redirect_uri.clone(),
        })
    }

    /// GET an API path (e.g. `/cycle?limit=1`) and parse the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.api_base, endpoint);
        tracing::debug!(endpoint, "WHOOP GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(AppError::transport)?;

        self.check_response_json(response).await
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.post_grant(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", "offline"),
        ])
        .await
    }

    /// Exchange an authorization code for the first token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.post_grant(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    async fn post_grant(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(AppError::transport)?;

        let tokens: TokenResponse = self.check_response_json(response).await?;
        if expiry_after(Utc::now(), tokens.expires_in).is_none() {
            return Err(AppError::WhoopApi {
                status: None,
                message: format!("Token response has unusable expires_in: {}", tokens.expires_in),
            });
        }
        Ok(tokens)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("WHOOP rate limit hit (429)");
            }

            return Err(AppError::WhoopApi {
                status: Some(status.as_u16()),
                message: upstream_message(status, &body),
            });
        }

        response.json().await.map_err(|e| AppError::WhoopApi {
            status: Some(status.as_u16()),
            message: format!("JSON parse error: {}", e),
        })
    }
}

/// Error fields WHOOP (and its OAuth server) put in failure bodies.
#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Best human-readable message for a failed upstream response.
fn upstream_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error_description).or(b.error));

    match parsed {
        Some(message) => message,
        None if !body.trim().is_empty() => format!("HTTP {}: {}", status, body.trim()),
        None => format!("HTTP {}", status),
    }
}
