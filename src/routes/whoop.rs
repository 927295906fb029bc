// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP data routes for the assistant (require the internal API key).

use crate::error::{AppError, Result};
use crate::models::{Cycle, DailySummary, Recovery, RecoveryHistoryEntry, Sleep, WeeklyReport};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// WHOOP caps collection pages at 25 records.
const MAX_LIMIT: u32 = 25;
const DEFAULT_HISTORY_LIMIT: u32 = 7;
const DEFAULT_WORKOUT_LIMIT: u32 = 10;

/// Data routes. The API key middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/whoop/sleep/latest", get(latest_sleep))
        .route("/whoop/sleep/history", get(sleep_history))
        .route("/whoop/recovery/latest", get(latest_recovery))
        .route("/whoop/recovery/history", get(recovery_history))
        .route("/whoop/cycle/latest", get(latest_cycle))
        .route("/whoop/cycle/history", get(cycle_history))
        .route("/whoop/workout/latest", get(latest_workout))
        .route("/whoop/workout/history", get(workout_history))
        .route("/whoop/profile", get(profile))
        .route("/whoop/body", get(body_measurement))
        .route("/whoop/summary/today", get(summary_today))
        .route("/whoop/report/weekly", get(report_weekly))
}

/// `?limit=` is kept as text so a malformed value falls back to the default
/// instead of failing extraction.
#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    limit: Option<String>,
}

impl HistoryQuery {
    /// Requested limit, capped at [`MAX_LIMIT`].
    ///
    /// Leading digits are used (`"5abc"` is 5). Absent, zero or non-numeric
    /// values give `default`.
    fn limit_or(&self, default: u32) -> u32 {
        let parsed = self.limit.as_deref().and_then(|raw| {
            let raw = raw.trim();
            let digits = raw
                .find(|c: char| !c.is_ascii_digit())
                .map_or(raw, |end| &raw[..end]);
            if digits.is_empty() {
                return None;
            }
            // Only overflow can fail here
            Some(digits.parse::<u32>().unwrap_or(u32::MAX))
        });

        match parsed {
            Some(0) | None => default,
            Some(limit) => limit.min(MAX_LIMIT),
        }
    }
}

/// `{records, count}` envelope for history endpoints.
#[derive(Serialize)]
pub struct RecordsResponse<T> {
    pub count: usize,
    pub records: Vec<T>,
}

impl<T> From<Vec<T>> for RecordsResponse<T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            count: records.len(),
            records,
        }
    }
}

fn found<T>(value: Option<T>, what: &str) -> Result<Json<T>> {
    value
        .map(Json)
        .ok_or_else(|| AppError::NoData(format!("No {} data found", what)))
}

// ─── Latest ──────────────────────────────────────────────────

async fn latest_sleep(State(state): State<Arc<AppState>>) -> Result<Json<Sleep>> {
    found(state.health.latest_sleep().await?, "sleep")
}

async fn latest_recovery(State(state): State<Arc<AppState>>) -> Result<Json<Recovery>> {
    found(state.health.latest_recovery().await?, "recovery")
}

async fn latest_cycle(State(state): State<Arc<AppState>>) -> Result<Json<Cycle>> {
    found(state.health.latest_cycle().await?, "cycle")
}

async fn latest_workout(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    found(state.health.latest_workout().await?, "workout")
}

// ─── History ─────────────────────────────────────────────────

async fn sleep_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<RecordsResponse<Sleep>>> {
    let limit = params.limit_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.health.sleep_history(limit).await?.into()))
}

async fn recovery_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<RecordsResponse<RecoveryHistoryEntry>>> {
    let limit = params.limit_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.health.recovery_history(limit).await?.into()))
}

async fn cycle_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<RecordsResponse<Cycle>>> {
    let limit = params.limit_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.health.cycle_history(limit).await?.into()))
}

async fn workout_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<RecordsResponse<Value>>> {
    let limit = params.limit_or(DEFAULT_WORKOUT_LIMIT);
    Ok(Json(state.health.workout_history(limit).await?.into()))
}

// ─── Profile ─────────────────────────────────────────────────

async fn profile(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.health.profile().await?))
}

async fn body_measurement(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.health.body_measurement().await?))
}

// ─── Aggregates ──────────────────────────────────────────────

async fn summary_today(State(state): State<Arc<AppState>>) -> Result<Json<DailySummary>> {
    Ok(Json(state.health.daily_summary().await?))
}

async fn report_weekly(State(state): State<Arc<AppState>>) -> Result<Json<WeeklyReport>> {
    Ok(Json(state.health.weekly_report().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(limit: Option<&str>) -> HistoryQuery {
        HistoryQuery {
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_limit_defaults_and_cap() {
        assert_eq!(q(None).limit_or(7), 7);
        assert_eq!(q(Some("0")).limit_or(10), 10);
        assert_eq!(q(Some("3")).limit_or(7), 3);
        assert_eq!(q(Some("500")).limit_or(7), MAX_LIMIT);
        assert_eq!(q(Some("99999999999999999999")).limit_or(7), MAX_LIMIT);
    }

    #[test]
    fn test_malformed_limit_falls_back_to_default() {
        assert_eq!(q(Some("abc")).limit_or(7), 7);
        assert_eq!(q(Some("")).limit_or(10), 10);
        assert_eq!(q(Some("-3")).limit_or(7), 7);
        assert_eq!(q(Some("5abc")).limit_or(7), 5);
    }
}
