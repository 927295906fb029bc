// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP v2 API records.
//!
//! Only the fields the gateway computes with are typed. Everything else is
//! kept in `extra` so passthrough endpoints return the upstream payload as-is.
//! Scores stay [`Number`] so an integer `44` is not re-encoded as `44.0`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Paginated `{records, next_token}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Sleep activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sleep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<SleepScore>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleepScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_summary: Option<StageSummary>,
    /// Sleep performance (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_performance_percentage: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-stage sleep durations in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_in_bed_time_milli: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_slow_wave_sleep_time_milli: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rem_sleep_time_milli: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sleep {
    fn stage_summary(&self) -> Option<&StageSummary> {
        self.score.as_ref()?.stage_summary.as_ref()
    }

    pub fn performance(&self) -> Option<f64> {
        self.score.as_ref()?.sleep_performance_percentage.as_ref()?.as_f64()
    }

    pub fn in_bed_millis(&self) -> Option<i64> {
        self.stage_summary()?.total_in_bed_time_milli
    }

    pub fn slow_wave_millis(&self) -> Option<i64> {
        self.stage_summary()?.total_slow_wave_sleep_time_milli
    }

    pub fn rem_millis(&self) -> Option<i64> {
        self.stage_summary()?.total_rem_sleep_time_milli
    }
}

/// Physiological cycle (roughly one day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<CycleScore>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleScore {
    /// Day strain (0-21)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cycle {
    pub fn strain(&self) -> Option<f64> {
        self.score.as_ref()?.strain.as_ref()?.as_f64()
    }
}

/// Recovery for one cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recovery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<RecoveryScore>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryScore {
    /// Recovery (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_score: Option<Number>,
    /// HRV (RMSSD) in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrv_rmssd_milli: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recovery {
    pub fn recovery_score(&self) -> Option<f64> {
        self.score.as_ref()?.recovery_score.as_ref()?.as_f64()
    }

    pub fn hrv_millis(&self) -> Option<f64> {
        self.score.as_ref()?.hrv_rmssd_milli.as_ref()?.as_f64()
    }

    pub fn resting_heart_rate(&self) -> Option<f64> {
        self.score.as_ref()?.resting_heart_rate.as_ref()?.as_f64()
    }
}

/// Recovery annotated with the cycle it was fetched for.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryHistoryEntry {
    /// Start of the cycle
    pub date: Option<String>,
    #[serde(flatten)]
    pub recovery: Recovery,
}

impl RecoveryHistoryEntry {
    pub fn new(cycle: &Cycle, mut recovery: Recovery) -> Self {
        recovery.cycle_id = Some(cycle.id);
        recovery.extra.remove("date");
        Self {
            date: cycle.start.clone(),
            recovery,
        }
    }

    pub fn cycle_id(&self) -> Option<u64> {
        self.recovery.cycle_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sleep_keeps_unknown_fields() {
        let raw = json!({
            "id": "ecfc6a15-4661-442f-a9a4-f160dd7afae8",
            "start": "2026-01-14T22:00:00.000Z",
            "end": "2026-01-15T06:00:00.000Z",
            "nap": false,
            "score": {
                "respiratory_rate": 16.1,
                "sleep_performance_percentage": 91.0,
                "stage_summary": {
                    "total_in_bed_time_milli": 28_800_000,
                    "sleep_cycle_count": 4
                }
            }
        });

        let sleep: Sleep = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(sleep.performance(), Some(91.0));
        assert_eq!(sleep.in_bed_millis(), Some(28_800_000));
        assert_eq!(sleep.slow_wave_millis(), None);

        assert_eq!(serde_json::to_value(&sleep).unwrap(), raw);
    }

    #[test]
    fn test_page_without_records_is_empty() {
        let page: Page<Cycle> = serde_json::from_value(json!({})).unwrap();
        assert!(page.records.is_empty());
        assert!(page.next_token.is_none());
    }

    #[test]
    fn test_history_entry_carries_cycle_id_and_date() {
        let cycle: Cycle = serde_json::from_value(json!({
            "id": 93845,
            "start": "2026-01-14T04:00:00.000Z"
        }))
        .unwrap();
        let recovery: Recovery = serde_json::from_value(json!({
            "sleep_id": "abc",
            "score": { "recovery_score": 44.0 }
        }))
        .unwrap();

        let entry = RecoveryHistoryEntry::new(&cycle, recovery);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["cycle_id"], 93845);
        assert_eq!(json["date"], "2026-01-14T04:00:00.000Z");
        assert_eq!(json["sleep_id"], "abc");
        assert_eq!(json["score"]["recovery_score"], 44.0);
    }

    #[test]
    fn test_integer_scores_are_not_reencoded_as_floats() {
        let raw = json!({
            "cycle_id": 93845,
            "score": {
                "recovery_score": 44,
                "resting_heart_rate": 64,
                "hrv_rmssd_milli": 31.813562
            }
        });

        let recovery: Recovery = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(recovery.recovery_score(), Some(44.0));
        assert_eq!(recovery.resting_heart_rate(), Some(64.0));

        let json = serde_json::to_value(&recovery).unwrap();
        assert_eq!(json, raw);
        assert_eq!(json["score"]["recovery_score"].as_u64(), Some(44));
    }
}
