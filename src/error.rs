// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No usable WHOOP credential; the user has to run the OAuth flow again.
    #[error("WHOOP authorization required")]
    AuthRequired,

    /// Missing or invalid internal API key.
    #[error("Authentication required")]
    Unauthorized,

    #[error("No data: {0}")]
    NoData(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("WHOOP API error: {message}")]
    WhoopApi {
        /// Upstream HTTP status, `None` for transport failures.
        status: Option<u16>,
        message: String,
    },

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build an upstream error from a transport-level failure.
    pub fn transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "WHOOP request timed out".to_string()
        } else {
            err.to_string()
        };
        AppError::WhoopApi {
            status: None,
            message,
        }
    }

    /// Upstream status code carried by this error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::WhoopApi { status, .. } => *status,
            _ => None,
        }
    }

    /// True when WHOOP rejected the bearer token (HTTP 401).
    pub fn is_whoop_unauthorized(&self) -> bool {
        self.upstream_status() == Some(401)
    }

    /// True when WHOOP answered 404 for the requested resource.
    pub fn is_whoop_not_found(&self) -> bool {
        self.upstream_status() == Some(404)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::AuthRequired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Please authorize at /auth/start".to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid Authorization header".to_string(),
            ),
            AppError::NoData(msg) => (StatusCode::NOT_FOUND, "NO_DATA", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::WhoopApi { status, message } => {
                tracing::error!(upstream_status = ?status, error = %message, "WHOOP API error");
                (StatusCode::INTERNAL_SERVER_ERROR, "API_ERROR", message.clone())
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Credential storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
