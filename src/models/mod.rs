// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credential;
pub mod summary;
pub mod whoop;

pub use credential::{Credential, TokenResponse};
pub use summary::{DailySummary, WeeklyReport};
pub use whoop::{Cycle, Recovery, RecoveryHistoryEntry, Sleep};
