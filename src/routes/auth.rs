// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP OAuth authorization routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::whoop::SCOPES;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a signed `state` value is accepted after `/auth/start`.
const STATE_MAX_AGE_MS: i64 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/start", get(auth_start))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/status", get(auth_status))
}

/// Start OAuth flow - redirect to WHOOP authorization.
async fn auth_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = sign_state(&state.config.oauth_state_key, Utc::now())?;

    let auth_url = format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
        state.config.whoop_auth_url,
        urlencoding::encode(&state.config.whoop_client_id),
        urlencoding::encode(&state.config.whoop_redirect_uri),
        urlencoding::encode(SCOPES),
        oauth_state
    );

    tracing::info!(
        client_id = %state.config.whoop_client_id,
        "Starting OAuth flow, redirecting to WHOOP"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback - exchange code for tokens and store them.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from WHOOP");
        let detail = params.error_description.unwrap_or(error);
        return failure_page(StatusCode::BAD_REQUEST, &detail);
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
    };

    let state_ok = params
        .state
        .as_deref()
        .is_some_and(|s| verify_state(s, &state.config.oauth_state_key, Utc::now()));
    if !state_ok {
        tracing::error!("Invalid or expired OAuth state parameter");
        return failure_page(
            StatusCode::BAD_REQUEST,
            "Invalid or expired state parameter",
        );
    }

    tracing::info!("Exchanging authorization code for tokens");

    match state.tokens().exchange_code(&code).await {
        Ok(_) => Html(SUCCESS_PAGE).into_response(),
        Err(AppError::WhoopApi { message, .. }) => {
            failure_page(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to complete authorization");
            failure_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to exchange code for token",
            )
        }
    }
}

/// Authorization status for the stored credential.
#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

async fn auth_status(State(state): State<Arc<AppState>>) -> Json<AuthStatusResponse> {
    let response = match state.store().load() {
        None => AuthStatusResponse {
            authorized: false,
            expired: None,
            expires_at: None,
            updated_at: None,
            message: Some("Not authorized. Please visit /auth/start".to_string()),
        },
        Some(credential) => AuthStatusResponse {
            authorized: true,
            expired: Some(credential.is_expired_at(Utc::now())),
            expires_at: Some(format_utc_rfc3339(credential.expires_at)),
            updated_at: Some(format_utc_rfc3339(credential.updated_at)),
            message: None,
        },
    };
    Json(response)
}

// ─── OAuth State ─────────────────────────────────────────────

/// Create a signed anti-forgery `state`: `base64url(nonce|issued_ms_hex|hmac_hex)`.
pub fn sign_state(key: &[u8], now: DateTime<Utc>) -> Result<String> {
    let mut nonce = [0u8; 16];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;

    let payload = format!("{}|{:x}", hex::encode(nonce), now.timestamp_millis());

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify the signature and age of a `state` produced by [`sign_state`].
pub fn verify_state(state: &str, key: &[u8], now: DateTime<Utc>) -> bool {
    let Some(decoded) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    let parts: Vec<&str> = decoded.splitn(3, '|').collect();
    let [nonce, issued_hex, signature_hex] = parts[..] else {
        return false;
    };

    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(format!("{}|{}", nonce, issued_hex).as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    let Ok(issued_ms) = i64::from_str_radix(issued_hex, 16) else {
        return false;
    };
    let age_ms = now.timestamp_millis() - issued_ms;
    (0..=STATE_MAX_AGE_MS).contains(&age_ms)
}

// ─── Result Pages ────────────────────────────────────────────

const SUCCESS_PAGE: &str = r#"<html>
  <body style="font-family: sans-serif; padding: 40px; text-align: center;">
    <h1>WHOOP Connected!</h1>
    <p>Authorization successful. You can now return to your assistant.</p>
    <p style="color: #888; font-size: 14px;">This window can be closed.</p>
  </body>
</html>"#;

fn failure_page(status: StatusCode, detail: &str) -> Response {
    let body = format!(
        r#"<html>
  <body style="font-family: sans-serif; padding: 40px; text-align: center;">
    <h1>Authorization Failed</h1>
    <p>{}</p>
    <a href="/auth/start">Try Again</a>
  </body>
</html>"#,
        escape_html(detail)
    );
    (status, Html(body)).into_response()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
