// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Internal API key middleware for the assistant-facing routes.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Middleware that requires `Authorization: Bearer <INTERNAL_API_KEY>`.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if !api_key_matches(presented, &state.config.internal_api_key) {
        tracing::warn!("Rejected request with invalid API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Constant-time key comparison. An unset key never matches.
fn api_key_matches(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches("secret", "secret"));
        assert!(!api_key_matches("secret2", "secret"));
        assert!(!api_key_matches("", "secret"));
        assert!(!api_key_matches("", ""));
    }
}
