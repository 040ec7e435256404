//! Core domain types for the health-export dataset.
//!
//! This module defines the fundamental types used throughout the system:
//! - Workouts and their optional measurements
//! - Metrics and their dated samples
//! - The cumulative dataset and the durable cache envelope
//!
//! Field names follow the export file format exactly (serde renames), so
//! the same types read both export files and the cache file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Strftime pattern for workout start/end timestamps in export files
/// (e.g. `2024-10-01 06:30:00 -0700`).
pub const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Strftime pattern for the `YYYY-MM-DD` date tokens used in file names
/// and the cache watermark.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Measurement Types
// ============================================================================

/// A unit-tagged quantity attached to a workout field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub units: String,
    #[serde(rename = "qty")]
    pub quantity: f64,
}

/// Like [`Measurement`] but with an integer quantity (the export format
/// records humidity this way).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerMeasurement {
    pub units: String,
    pub qty: i64,
}

// ============================================================================
// Workout and Metric Types
// ============================================================================

/// A single recorded workout. Identity is the source-assigned `id`; the
/// source does not guarantee uniqueness across overlapping export files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<Measurement>,
    #[serde(rename = "activeEnergyBurned", skip_serializing_if = "Option::is_none")]
    pub active_energy_burned: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<IntegerMeasurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Measurement>,
    #[serde(rename = "lapLength", skip_serializing_if = "Option::is_none")]
    pub lap_length: Option<Measurement>,
}

/// One dated sample of a periodic metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub date: String,
    #[serde(rename = "qty")]
    pub quantity: f64,
}

/// A named metric series (e.g. resting heart rate) with its samples.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub units: String,
    #[serde(rename = "data")]
    pub samples: Vec<MetricSample>,
}

// ============================================================================
// Dataset and Cache Envelope
// ============================================================================

/// The cumulative in-memory collection of workouts and metrics.
///
/// Owned by the sync engine; consumers only ever see read snapshots.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl Dataset {
    /// Append another dataset's records onto this one.
    ///
    /// No de-duplication is attempted: the export source does not enforce
    /// unique workout ids, and the merged collections preserve source
    /// fidelity (see DESIGN.md on the duplicate-accumulation trade-off).
    pub fn merge(&mut self, other: Dataset) {
        self.workouts.extend(other.workouts);
        self.metrics.extend(other.metrics);
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty() && self.metrics.is_empty()
    }
}

/// The shared envelope of export files and the durable cache file.
///
/// Export files carry only `data`; the cache file additionally carries
/// `lastUpdated`, the watermark date. Invariant: the watermark, when
/// present, is the maximum file-date token among all files ever folded
/// into `data`, and never decreases across cache writes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealthData {
    pub data: Dataset,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_workout(id: &str) -> Workout {
        Workout {
            id: id.into(),
            name: "Pool Swim".into(),
            start: "2024-10-01 06:30:00 -0700".into(),
            end: "2024-10-01 07:10:00 -0700".into(),
            duration_seconds: 2400.0,
            distance: Some(Measurement {
                units: "mi".into(),
                quantity: 1.25,
            }),
            active_energy_burned: None,
            intensity: None,
            location: None,
            humidity: None,
            temperature: None,
            lap_length: None,
        }
    }

    #[test]
    fn workout_serializes_with_export_field_names() {
        let json = serde_json::to_value(sample_workout("w1")).unwrap();
        assert_eq!(json["duration"], 2400.0);
        assert_eq!(json["distance"]["qty"], 1.25);
        // Absent optional fields are omitted, not null
        assert!(json.get("activeEnergyBurned").is_none());
        assert!(json.get("location").is_none());
    }

    #[test]
    fn workout_deserializes_export_json() {
        let json = r#"{
            "id": "ABC",
            "name": "Outdoor Run",
            "start": "2024-10-01 06:30:00 -0700",
            "end": "2024-10-01 07:10:00 -0700",
            "duration": 2400.5,
            "activeEnergyBurned": {"units": "kcal", "qty": 350.25},
            "humidity": {"units": "%", "qty": 60}
        }"#;
        let w: Workout = serde_json::from_str(json).unwrap();
        assert_eq!(w.duration_seconds, 2400.5);
        assert_eq!(w.active_energy_burned.as_ref().unwrap().quantity, 350.25);
        assert_eq!(w.humidity.as_ref().unwrap().qty, 60);
        assert!(w.distance.is_none());
    }

    #[test]
    fn metric_samples_use_data_key() {
        let json = r#"{
            "name": "resting_heart_rate",
            "units": "bpm",
            "data": [{"date": "2024-10-01T00:00:00Z", "qty": 52.0}]
        }"#;
        let m: Metric = serde_json::from_str(json).unwrap();
        assert_eq!(m.samples.len(), 1);
        assert_eq!(m.samples[0].quantity, 52.0);
    }

    #[test]
    fn merge_appends_without_dedup() {
        let mut base = Dataset {
            workouts: vec![sample_workout("a"), sample_workout("b")],
            metrics: vec![],
        };
        let incoming = Dataset {
            workouts: vec![sample_workout("a")], // same id on purpose
            metrics: vec![Metric {
                name: "steps".into(),
                units: "count".into(),
                samples: vec![],
            }],
        };

        base.merge(incoming);
        assert_eq!(base.workouts.len(), 3);
        assert_eq!(base.metrics.len(), 1);
    }

    #[test]
    fn watermark_round_trips_as_date_string() {
        let health = HealthData {
            data: Dataset::default(),
            last_updated: Some(NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()),
        };
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("\"lastUpdated\":\"2024-11-05\""));

        let parsed: HealthData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.last_updated, health.last_updated);
    }

    #[test]
    fn envelope_without_watermark_parses() {
        // Export files carry only the data key
        let parsed: HealthData =
            serde_json::from_str(r#"{"data": {"workouts": [], "metrics": []}}"#).unwrap();
        assert!(parsed.last_updated.is_none());
        assert!(parsed.data.is_empty());
    }
}
