// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! WHOOP gateway: single-user WHOOP data for an assistant
//!
//! This crate keeps one WHOOP OAuth credential alive (storage, proactive and
//! reactive refresh) and serves simplified, aggregated health endpoints.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::CredentialStore;
use services::{AuthenticatedFetcher, HealthService, TokenManager, WhoopClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub health: HealthService,
}

impl AppState {
    /// Wire the service stack around `store`.
    pub fn new(config: Config, store: CredentialStore) -> error::Result<Self> {
        let client = WhoopClient::new(&config)?;
        let tokens = TokenManager::new(client.clone(), store);
        let fetcher = AuthenticatedFetcher::new(client, tokens);

        Ok(Self {
            config,
            health: HealthService::new(fetcher),
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        self.health.fetcher().tokens()
    }

    pub fn store(&self) -> &CredentialStore {
        self.tokens().store()
    }
}
