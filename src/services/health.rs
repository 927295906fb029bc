// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health data aggregation over the WHOOP API.
//!
//! Simple resources are thin passthroughs. The daily summary, weekly report and
//! recovery history combine several requests; each sub-request is captured as
//! an [`Outcome`] so one missing piece degrades that piece only.

use crate::error::{AppError, Result};
use crate::models::summary::{DailySummary, WeeklyReport};
use crate::models::whoop::{Cycle, Page, Recovery, RecoveryHistoryEntry, Sleep};
use crate::services::AuthenticatedFetcher;
use crate::time_utils::format_utc_date;
use futures_util::{stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Days covered by the weekly report.
const REPORT_DAYS: u32 = 7;

/// Per-cycle recovery lookups in flight at once.
const MAX_CONCURRENT_RECOVERY_FETCHES: usize = 4;

/// Result of one sub-request inside an aggregate.
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    Missing,
    Failed(AppError),
}

impl<T> Outcome<T> {
    pub fn from_result(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Outcome::Found(value),
            Ok(None) => Outcome::Missing,
            Err(AppError::NoData(_)) => Outcome::Missing,
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Degrade to `None`, logging upstream failures.
    ///
    /// `AuthRequired` is not a data failure: it is returned so the caller can
    /// send the user back through authorization.
    pub fn into_option(self, what: &str) -> Result<Option<T>> {
        match self {
            Outcome::Found(value) => Ok(Some(value)),
            Outcome::Missing => Ok(None),
            Outcome::Failed(AppError::AuthRequired) => Err(AppError::AuthRequired),
            Outcome::Failed(e) => {
                tracing::warn!(error = %e, what, "Sub-request failed, continuing without it");
                Ok(None)
            }
        }
    }
}

/// Aggregation engine over [`AuthenticatedFetcher`].
#[derive(Clone)]
pub struct HealthService {
    fetcher: AuthenticatedFetcher,
}

impl HealthService {
    pub fn new(fetcher: AuthenticatedFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &AuthenticatedFetcher {
        &self.fetcher
    }

    async fn records<T: DeserializeOwned>(&self, path: &str, limit: u32) -> Result<Vec<T>> {
        let page: Page<T> = self
            .fetcher
            .get(&format!("{}?limit={}", path, limit))
            .await?;
        Ok(page.records)
    }

    async fn latest<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        Ok(self.records(path, 1).await?.into_iter().next())
    }

    // ─── Passthrough Resources ───────────────────────────────────

    pub async fn latest_sleep(&self) -> Result<Option<Sleep>> {
        self.latest("/activity/sleep").await
    }

    pub async fn latest_cycle(&self) -> Result<Option<Cycle>> {
        self.latest("/cycle").await
    }

    pub async fn latest_workout(&self) -> Result<Option<Value>> {
        self.latest("/activity/workout").await
    }

    pub async fn sleep_history(&self, limit: u32) -> Result<Vec<Sleep>> {
        self.records("/activity/sleep", limit).await
    }

    pub async fn cycle_history(&self, limit: u32) -> Result<Vec<Cycle>> {
        self.records("/cycle", limit).await
    }

    pub async fn workout_history(&self, limit: u32) -> Result<Vec<Value>> {
        self.records("/activity/workout", limit).await
    }

    pub async fn profile(&self) -> Result<Value> {
        self.fetcher.get("/user/profile/basic").await
    }

    pub async fn body_measurement(&self) -> Result<Value> {
        self.fetcher.get("/user/measurement/body").await
    }

    // ─── Recovery ────────────────────────────────────────────────

    /// Recovery for one cycle; `None` when WHOOP has none (404).
    ///
    /// Cycle ids are typed integers, so a 404 here cannot come from a
    /// malformed id and always means "not scored yet".
    pub async fn recovery_for_cycle(&self, cycle_id: u64) -> Result<Option<Recovery>> {
        match self
            .fetcher
            .get(&format!("/cycle/{}/recovery", cycle_id))
            .await
        {
            Ok(recovery) => Ok(Some(recovery)),
            Err(e) if e.is_whoop_not_found() => {
                tracing::debug!(cycle_id, "No recovery for cycle");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Recovery of the most recent cycle.
    pub async fn latest_recovery(&self) -> Result<Option<Recovery>> {
        match self.latest_cycle().await? {
            Some(cycle) => self.recovery_for_cycle(cycle.id).await,
            None => Ok(None),
        }
    }

    /// Recoveries of the `limit` most recent cycles, skipping cycles without one.
    pub async fn recovery_history(&self, limit: u32) -> Result<Vec<RecoveryHistoryEntry>> {
        let cycles = self.cycle_history(limit).await?;

        let outcomes: Vec<(Cycle, Outcome<Recovery>)> = stream::iter(cycles)
            .map(|cycle| async move {
                let outcome = Outcome::from_result(self.recovery_for_cycle(cycle.id).await);
                (cycle, outcome)
            })
            .buffered(MAX_CONCURRENT_RECOVERY_FETCHES)
            .collect()
            .await;

        let mut entries = Vec::with_capacity(outcomes.len());
        for (cycle, outcome) in outcomes {
            if let Some(recovery) = outcome.into_option("cycle recovery")? {
                entries.push(RecoveryHistoryEntry::new(&cycle, recovery));
            }
        }

        tracing::debug!(
            requested = limit,
            returned = entries.len(),
            "Recovery history assembled"
        );
        Ok(entries)
    }

    // ─── Aggregates ──────────────────────────────────────────────

    /// Latest sleep and recovery with flags and a training hint.
    pub async fn daily_summary(&self) -> Result<DailySummary> {
        let (sleep, recovery) = tokio::join!(self.latest_sleep(), self.latest_recovery());

        let sleep = Outcome::from_result(sleep).into_option("latest sleep")?;
        let recovery = Outcome::from_result(recovery).into_option("latest recovery")?;

        Ok(DailySummary::build(
            format_utc_date(chrono::Utc::now()),
            sleep.as_ref(),
            recovery.as_ref(),
        ))
    }

    /// Seven-day sleep and strain trends.
    pub async fn weekly_report(&self) -> Result<WeeklyReport> {
        let (sleeps, cycles) = tokio::join!(
            self.sleep_history(REPORT_DAYS),
            self.cycle_history(REPORT_DAYS)
        );

        let sleeps = Outcome::from_result(sleeps.map(Some))
            .into_option("sleep history")?
            .unwrap_or_default();
        let cycles = Outcome::from_result(cycles.map(Some))
            .into_option("cycle history")?
            .unwrap_or_default();

        Ok(WeeklyReport::build(&sleeps, &cycles))
    }
}
