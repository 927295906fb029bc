// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP token lifecycle.
//!
//! The stored credential moves between four implicit states:
//!
//! - **Absent**: nothing stored; only the authorization-code flow leaves it.
//! - **Valid**: usable access token.
//! - **NearExpiry**: within [`EXPIRY_BUFFER_SECS`] of expiry; refreshed before use.
//! - **Invalid**: rejected upstream despite the timestamp; refreshed reactively.
//!
//! [`TokenManager::refresh`] is the only transition out of Valid/NearExpiry/
//! Invalid: to Valid on success, to Absent when the refresh token is refused.
//!
//! [`EXPIRY_BUFFER_SECS`]: crate::models::credential::EXPIRY_BUFFER_SECS

use crate::db::CredentialStore;
use crate::error::{AppError, Result};
use crate::models::Credential;
use crate::services::WhoopClient;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Refreshes and persists the WHOOP credential.
#[derive(Clone)]
pub struct TokenManager {
    client: WhoopClient,
    store: CredentialStore,
    /// Serializes refresh-token exchanges; WHOOP rotates refresh tokens, so a
    /// second concurrent exchange with the old one would be rejected.
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenManager {
    pub fn new(client: WhoopClient, store: CredentialStore) -> Self {
        Self {
            client,
            store,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Exchange an authorization code and store the resulting credential.
    ///
    /// A failed exchange leaves any existing credential untouched.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let tokens = self.client.exchange_code(code).await.map_err(|e| {
            tracing::error!(error = %e, "WHOOP authorization code exchange failed");
            e
        })?;

        let _guard = self.refresh_lock.lock().await;
        let credential =
            self.store
                .save(&tokens.access_token, &tokens.refresh_token, tokens.expires_in)?;

        tracing::info!(expires_at = %credential.expires_at, "WHOOP authorization stored");
        Ok(credential)
    }

    /// Refresh unconditionally.
    pub async fn refresh(&self) -> Result<Credential> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Proactive refresh before a request.
    ///
    /// If another task refreshed while we waited for the lock, its credential
    /// is reused.
    pub async fn refresh_expired(&self) -> Result<Credential> {
        let _guard = self.refresh_lock.lock().await;

        match self.store.load() {
            Some(current) if !current.is_expired_at(chrono::Utc::now()) => {
                tracing::debug!("Credential already refreshed by another request");
                Ok(current)
            }
            _ => self.refresh_locked().await,
        }
    }

    /// Reactive refresh after WHOOP rejected `rejected_access_token`.
    ///
    /// Skips the exchange if the stored access token has already changed.
    pub async fn refresh_rejected(&self, rejected_access_token: &str) -> Result<Credential> {
        let _guard = self.refresh_lock.lock().await;

        match self.store.load() {
            Some(current) if current.access_token != rejected_access_token => {
                tracing::debug!("Rejected token already replaced by another request");
                Ok(current)
            }
            _ => self.refresh_locked().await,
        }
    }

    /// Perform the refresh-token grant. Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<Credential> {
        let current = self.store.load().ok_or(AppError::AuthRequired)?;
        if current.refresh_token.is_empty() {
            return Err(AppError::AuthRequired);
        }

        tracing::info!("Refreshing WHOOP access token");

        let tokens = match self.client.refresh_token(&current.refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(error = %e, "WHOOP token refresh failed, clearing credential");
                if let Err(clear_err) = self.store.clear() {
                    tracing::error!(error = %clear_err, "Failed to clear rejected credential");
                }
                return Err(AppError::AuthRequired);
            }
        };

        let credential =
            self.store
                .save(&tokens.access_token, &tokens.refresh_token, tokens.expires_in)?;

        tracing::info!(expires_at = %credential.expires_at, "WHOOP token refreshed");
        Ok(credential)
    }
}
