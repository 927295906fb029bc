// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-tenant credential store.

use super::{CredentialBackend, FileBackend, MemoryBackend, StoreError};
use crate::models::Credential;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Owner of the one persisted WHOOP credential.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn CredentialBackend>,
}

impl CredentialStore {
    pub fn new(backend: impl CredentialBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Store backed by a JSON file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(path))
    }

    /// Store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Persist a freshly issued token, replacing any previous credential.
    pub fn save(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: i64,
    ) -> Result<Credential, StoreError> {
        self.save_at(access_token, refresh_token, expires_in_secs, Utc::now())
    }

    /// [`save`](Self::save) with an explicit issue time.
    pub fn save_at(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Credential, StoreError> {
        let credential = Credential::issue(access_token, refresh_token, expires_in_secs, now)
            .ok_or(StoreError::InvalidLifetime(expires_in_secs))?;
        let contents = serde_json::to_vec_pretty(&credential)?;
        self.backend.write(&contents)?;

        tracing::debug!(
            expires_at = %credential.expires_at,
            "Credential saved"
        );
        Ok(credential)
    }

    /// Load the stored credential.
    ///
    /// Unreadable or corrupt records are logged and reported as absent.
    pub fn load(&self) -> Option<Credential> {
        let bytes = match self.backend.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read credential, treating as absent");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt credential record, treating as absent");
                None
            }
        }
    }

    /// True if there is no credential or it expires within the buffer.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.load().map_or(true, |c| c.is_expired_at(now))
    }

    /// Delete the stored credential. No-op if none exists.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove()?;
        tracing::info!("Credential cleared");
        Ok(())
    }
}
