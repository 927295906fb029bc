// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The persisted WHOOP OAuth credential.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Margin before token expiration when we proactively refresh (5 minutes).
pub const EXPIRY_BUFFER_SECS: i64 = 5 * 60;

/// OAuth tokens for the single authorized WHOOP user.
///
/// Timestamps are stored as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    /// When this record was last written
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from a token response received at `now`.
    ///
    /// Timestamps are truncated to the millisecond precision they persist with.
    /// Returns `None` if `expires_in_secs` is negative or out of range.
    pub fn issue(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: i64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let now = now.trunc_subsecs(3);
        Some(Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: expiry_after(now, expires_in_secs)?,
            updated_at: now,
        })
    }

    /// Whether the token is expired (or expiring within the buffer) at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_BUFFER_SECS) >= self.expires_at
    }
}

/// `now + expires_in_secs`, or `None` for a negative or unrepresentable lifetime.
pub fn expiry_after(now: DateTime<Utc>, expires_in_secs: i64) -> Option<DateTime<Utc>> {
    if expires_in_secs < 0 {
        return None;
    }
    now.checked_add_signed(Duration::try_seconds(expires_in_secs)?)
}

/// Token endpoint response for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}
