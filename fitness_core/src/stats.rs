//! Aggregation reports over workout snapshots.
//!
//! Workouts with unparseable start timestamps are skipped by the
//! time-bucketed aggregations.

use crate::{Workout, EXPORT_TIME_FORMAT};
use chrono::{DateTime, Datelike, Duration};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Count workouts per `YYYY-MM` month bucket.
pub fn workouts_per_month(workouts: &[Workout]) -> BTreeMap<String, usize> {
    let mut buckets = BTreeMap::new();
    for w in workouts {
        let Ok(start) = DateTime::parse_from_str(&w.start, EXPORT_TIME_FORMAT) else {
            continue;
        };
        *buckets.entry(start.format("%Y-%m").to_string()).or_insert(0) += 1;
    }
    buckets
}

/// Total recorded distance per workout name.
pub fn distance_per_workout(workouts: &[Workout]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for w in workouts {
        if let Some(d) = &w.distance {
            *totals.entry(w.name.clone()).or_insert(0.0) += d.quantity;
        }
    }
    totals
}

/// Total active energy per week, keyed by the Monday starting the week.
pub fn energy_per_week(workouts: &[Workout]) -> BTreeMap<String, f64> {
    let mut buckets = BTreeMap::new();
    for w in workouts {
        let Some(energy) = &w.active_energy_burned else {
            continue;
        };
        let Ok(start) = DateTime::parse_from_str(&w.start, EXPORT_TIME_FORMAT) else {
            continue;
        };
        let days_from_monday = start.weekday().num_days_from_monday() as i64;
        let week_start = start.date_naive() - Duration::days(days_from_monday);
        *buckets
            .entry(week_start.format("%Y-%m-%d").to_string())
            .or_insert(0.0) += energy.quantity;
    }
    buckets
}

/// Render the workouts-per-month report.
pub fn render_workouts_per_month(workouts: &[Workout], descending: bool) -> String {
    let buckets = workouts_per_month(workouts);
    let mut out = String::from("\nWorkouts per Month:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for (month, count) in ordered(&buckets, descending) {
        let _ = writeln!(out, "{}: {}", month, count);
    }
    out
}

/// Render the distance-per-workout report.
pub fn render_distance_per_workout(workouts: &[Workout]) -> String {
    let totals = distance_per_workout(workouts);
    let mut out = String::from("\nDistance per Workout:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    let _ = writeln!(out, "{:<20} {:<20}", "Workout", "Distance");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for (name, total) in &totals {
        let _ = writeln!(out, "{:<20} {:<7.2} miles", name, total);
    }
    out
}

/// Render the energy-per-week report.
pub fn render_energy_per_week(workouts: &[Workout], descending: bool) -> String {
    let buckets = energy_per_week(workouts);
    let mut out = String::from("\nEnergy Burned per Week:\n");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for (week, total) in ordered(&buckets, descending) {
        let _ = writeln!(out, "Week Of {}: {:.2} kcal", week, total);
    }
    out
}

fn ordered<V>(buckets: &BTreeMap<String, V>, descending: bool) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = buckets.iter().collect();
    if descending {
        entries.reverse();
    }
    entries
}
