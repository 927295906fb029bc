// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod fetcher;
pub mod health;
pub mod token;
pub mod whoop;

pub use fetcher::{Attempt, AuthenticatedFetcher};
pub use health::{HealthService, Outcome};
pub use token::TokenManager;
pub use whoop::WhoopClient;
