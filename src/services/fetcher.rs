// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated access to the WHOOP API.

use crate::error::{AppError, Result};
use crate::models::Credential;
use crate::services::{TokenManager, WhoopClient};
use serde::de::DeserializeOwned;

/// Position in the bounded request sequence:
/// `First` → (401) refresh → `Retry` → done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

impl Attempt {
    /// The attempt allowed after a 401, if any.
    pub fn after_unauthorized(self) -> Option<Attempt> {
        match self {
            Attempt::First => Some(Attempt::Retry),
            Attempt::Retry => None,
        }
    }
}

/// Issues WHOOP requests with a valid access token.
///
/// Refreshes proactively when the stored token is near expiry and reactively,
/// exactly once, when WHOOP answers 401.
#[derive(Clone)]
pub struct AuthenticatedFetcher {
    client: WhoopClient,
    tokens: TokenManager,
}

impl AuthenticatedFetcher {
    pub fn new(client: WhoopClient, tokens: TokenManager) -> Self {
        Self { client, tokens }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// GET an API path such as `/activity/sleep?limit=1`.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let mut credential = self.current_credential().await?;
        let mut attempt = Attempt::First;

        loop {
            let result = self
                .client
                .get_json(endpoint, &credential.access_token)
                .await;

            match result {
                Err(e) if e.is_whoop_unauthorized() => match attempt.after_unauthorized() {
                    Some(next) => {
                        tracing::warn!(endpoint, "WHOOP rejected access token, refreshing");
                        credential = self
                            .tokens
                            .refresh_rejected(&credential.access_token)
                            .await?;
                        attempt = next;
                    }
                    None => return Err(e),
                },
                other => return other,
            }
        }
    }

    /// Stored credential, refreshed first if it is near expiry.
    async fn current_credential(&self) -> Result<Credential> {
        match self.tokens.store().load() {
            None => Err(AppError::AuthRequired),
            Some(credential) if credential.is_expired_at(chrono::Utc::now()) => {
                self.tokens.refresh_expired().await
            }
            Some(credential) => Ok(credential),
        }
    }
}
