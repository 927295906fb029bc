// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived health summaries built from WHOOP records.
//!
//! Everything here is pure: the aggregation service fetches the records and
//! hands them to these builders.

use crate::models::whoop::{Cycle, Recovery, Sleep};
use serde::Serialize;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;

const SHORT_SLEEP_HOURS: f64 = 6.0;
const LOW_DEEP_SLEEP_MINUTES: f64 = 60.0;
const LOW_HRV_MILLIS: f64 = 50.0;
const LOW_RECOVERY_SCORE: f64 = 34.0;
const HIGH_RECOVERY_SCORE: f64 = 67.0;

/// Number of most-recent records listed in the weekly report.
const RECENT_RECORDS: usize = 3;

/// Condition worth mentioning to the user, in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    ShortSleep,
    LowDeepSleep,
    LowHrv,
    LowRecovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    High,
    Moderate,
    Low,
    Unknown,
}

/// Suggested training load for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingHint {
    pub intensity: Intensity,
    pub focus: &'static str,
}

impl TrainingHint {
    /// Derive the hint from the recovery score alone.
    pub fn from_recovery_score(score: Option<f64>) -> Self {
        let (intensity, focus) = match score {
            None => (Intensity::Unknown, "rest"),
            Some(s) if s >= HIGH_RECOVERY_SCORE => (Intensity::High, "strength or HIIT"),
            Some(s) if s >= LOW_RECOVERY_SCORE => (Intensity::Moderate, "cardio or skill work"),
            Some(_) => (Intensity::Low, "active recovery or rest"),
        };
        Self { intensity, focus }
    }
}

/// Compute the summary flags.
///
/// A sleep without stage data counts as zero hours in bed and zero deep sleep.
pub fn compute_flags(sleep: Option<&Sleep>, recovery: Option<&Recovery>) -> Vec<Flag> {
    let mut flags = Vec::new();

    if let Some(sleep) = sleep {
        let in_bed_hours = sleep.in_bed_millis().unwrap_or(0) as f64 / MILLIS_PER_HOUR;
        if in_bed_hours < SHORT_SLEEP_HOURS {
            flags.push(Flag::ShortSleep);
        }

        let deep_minutes = sleep.slow_wave_millis().unwrap_or(0) as f64 / MILLIS_PER_MINUTE;
        if deep_minutes < LOW_DEEP_SLEEP_MINUTES {
            flags.push(Flag::LowDeepSleep);
        }
    }

    if let Some(recovery) = recovery {
        if recovery.hrv_millis().is_some_and(|hrv| hrv < LOW_HRV_MILLIS) {
            flags.push(Flag::LowHrv);
        }
        if recovery
            .recovery_score()
            .is_some_and(|score| score < LOW_RECOVERY_SCORE)
        {
            flags.push(Flag::LowRecovery);
        }
    }

    flags
}

/// Milliseconds as hours with one decimal, e.g. `"7.5"`.
pub fn millis_to_hours(millis: i64) -> String {
    format_one_decimal(millis as f64 / MILLIS_PER_HOUR)
}

/// Milliseconds as whole minutes.
pub fn millis_to_minutes(millis: i64) -> i64 {
    (millis as f64 / MILLIS_PER_MINUTE).round() as i64
}

/// Round half away from zero to one decimal, so `7.25` becomes `"7.3"`.
fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

// ─── Daily Summary ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    /// Today's date (UTC)
    pub date: String,
    pub sleep: Option<SleepSummary>,
    pub recovery: Option<RecoverySummary>,
    pub flags: Vec<Flag>,
    pub training_hint: TrainingHint,
}

#[derive(Debug, Clone, Serialize)]
pub struct SleepSummary {
    pub start: Option<String>,
    pub end: Option<String>,
    pub score: Option<f64>,
    pub duration_hours: Option<String>,
    pub deep_sleep_mins: Option<i64>,
    pub rem_sleep_mins: Option<i64>,
}

impl From<&Sleep> for SleepSummary {
    fn from(sleep: &Sleep) -> Self {
        Self {
            start: sleep.start.clone(),
            end: sleep.end.clone(),
            score: sleep.performance(),
            duration_hours: sleep.in_bed_millis().map(millis_to_hours),
            deep_sleep_mins: sleep.slow_wave_millis().map(millis_to_minutes),
            rem_sleep_mins: sleep.rem_millis().map(millis_to_minutes),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoverySummary {
    pub score: Option<f64>,
    pub hrv: Option<f64>,
    pub rhr: Option<f64>,
    pub timestamp: Option<String>,
}

impl From<&Recovery> for RecoverySummary {
    fn from(recovery: &Recovery) -> Self {
        Self {
            score: recovery.recovery_score(),
            hrv: recovery.hrv_millis(),
            rhr: recovery.resting_heart_rate(),
            timestamp: recovery.created_at.clone(),
        }
    }
}

impl DailySummary {
    pub fn build(date: String, sleep: Option<&Sleep>, recovery: Option<&Recovery>) -> Self {
        Self {
            date,
            sleep: sleep.map(SleepSummary::from),
            recovery: recovery.map(RecoverySummary::from),
            flags: compute_flags(sleep, recovery),
            training_hint: TrainingHint::from_recovery_score(
                recovery.and_then(Recovery::recovery_score),
            ),
        }
    }
}

// ─── Weekly Report ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub period: &'static str,
    pub sleep: SleepTrend,
    pub strain: StrainTrend,
}

#[derive(Debug, Clone, Serialize)]
pub struct SleepTrend {
    pub average_score: Option<i64>,
    pub total_records: usize,
    pub recent: Vec<RecentSleep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSleep {
    pub date: Option<String>,
    pub score: Option<f64>,
    pub duration_hours: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrainTrend {
    pub average: Option<String>,
    pub recent: Vec<RecentStrain>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentStrain {
    pub date: Option<String>,
    pub strain: Option<String>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean sleep performance over scored records, rounded to an integer.
pub fn average_sleep_score(sleeps: &[Sleep]) -> Option<i64> {
    let scores: Vec<f64> = sleeps.iter().filter_map(Sleep::performance).collect();
    mean(&scores).map(|avg| avg.round() as i64)
}

/// Mean strain over cycles that have one, with one decimal.
pub fn average_strain(cycles: &[Cycle]) -> Option<String> {
    let strains: Vec<f64> = cycles.iter().filter_map(Cycle::strain).collect();
    mean(&strains).map(format_one_decimal)
}

impl WeeklyReport {
    /// Build the report. Records are expected most-recent-first.
    pub fn build(sleeps: &[Sleep], cycles: &[Cycle]) -> Self {
        let recent_sleep = sleeps
            .iter()
            .take(RECENT_RECORDS)
            .map(|s| RecentSleep {
                date: s.start.clone(),
                score: s.performance(),
                duration_hours: s.in_bed_millis().map(millis_to_hours),
            })
            .collect();

        let recent_strain = cycles
            .iter()
            .take(RECENT_RECORDS)
            .map(|c| RecentStrain {
                date: c.start.clone(),
                strain: c.strain().map(format_one_decimal),
            })
            .collect();

        Self {
            period: "7 days",
            sleep: SleepTrend {
                average_score: average_sleep_score(sleeps),
                total_records: sleeps.len(),
                recent: recent_sleep,
            },
            strain: StrainTrend {
                average: average_strain(cycles),
                recent: recent_strain,
            },
        }
    }
}
