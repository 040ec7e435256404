//! Read-only filtering, sorting, and capping over dataset snapshots.
//!
//! Every function here takes a borrowed snapshot and returns a fresh
//! `Vec`; the cumulative dataset owned by the sync engine is never
//! mutated by a query.

use crate::{Error, Result, Workout, EXPORT_TIME_FORMAT};
use chrono::{DateTime, NaiveDate};
use std::str::FromStr;

/// Which workout field a CLI filter inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Name,
    Distance,
    Duration,
    Energy,
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(FilterKind::Name),
            "distance" => Ok(FilterKind::Distance),
            "duration" => Ok(FilterKind::Duration),
            "energy" => Ok(FilterKind::Energy),
            other => Err(Error::Other(format!(
                "unknown filter type '{}' (expected name, distance, duration, energy)",
                other
            ))),
        }
    }
}

/// A single-record predicate built from CLI flags.
#[derive(Clone, Debug)]
pub struct WorkoutFilter {
    pub kind: FilterKind,
    pub value: String,
}

impl WorkoutFilter {
    pub fn matches(&self, workout: &Workout) -> bool {
        match self.kind {
            FilterKind::Name => workout
                .name
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
            // Numeric kinds compare the quantity rendered to one decimal
            // place, matching how the values are shown in reports.
            FilterKind::Distance => workout
                .distance
                .as_ref()
                .is_some_and(|d| format!("{:.1}", d.quantity) == self.value),
            FilterKind::Duration => format!("{:.1}", workout.duration_seconds) == self.value,
            FilterKind::Energy => workout
                .active_energy_burned
                .as_ref()
                .is_some_and(|e| format!("{:.1}", e.quantity) == self.value),
        }
    }
}

/// Sortable workout fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Date,
    Duration,
    Distance,
    Energy,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "date" => Ok(SortKey::Date),
            "duration" => Ok(SortKey::Duration),
            "distance" => Ok(SortKey::Distance),
            "energy" => Ok(SortKey::Energy),
            other => Err(Error::Other(format!(
                "unknown sort field '{}' (expected name, date, duration, distance, energy)",
                other
            ))),
        }
    }
}

/// Sort workouts in place by the given key.
pub fn sort_workouts(workouts: &mut [Workout], key: SortKey, descending: bool) {
    workouts.sort_by(|a, b| {
        let ord = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Date => a.start.cmp(&b.start),
            SortKey::Duration => a
                .duration_seconds
                .partial_cmp(&b.duration_seconds)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortKey::Distance => quantity(&a.distance)
                .partial_cmp(&quantity(&b.distance))
                .unwrap_or(std::cmp::Ordering::Equal),
            SortKey::Energy => quantity(&a.active_energy_burned)
                .partial_cmp(&quantity(&b.active_energy_burned))
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn quantity(m: &Option<crate::Measurement>) -> f64 {
    m.as_ref().map(|m| m.quantity).unwrap_or(0.0)
}

/// Apply an optional filter and an item cap to a workout snapshot.
/// A cap of 0 means unlimited.
pub fn select_workouts(
    snapshot: &[Workout],
    filter: Option<&WorkoutFilter>,
    max_items: usize,
) -> Vec<Workout> {
    let mut selected: Vec<Workout> = snapshot
        .iter()
        .filter(|w| filter.map_or(true, |f| f.matches(w)))
        .cloned()
        .collect();
    if max_items > 0 && selected.len() > max_items {
        selected.truncate(max_items);
    }
    selected
}

/// Apply an optional name filter and an item cap to a metric snapshot.
pub fn select_metrics(
    snapshot: &[crate::Metric],
    name_filter: Option<&str>,
    max_items: usize,
) -> Vec<crate::Metric> {
    let mut selected: Vec<crate::Metric> = snapshot
        .iter()
        .filter(|m| {
            name_filter.map_or(true, |f| m.name.to_lowercase().contains(&f.to_lowercase()))
        })
        .cloned()
        .collect();
    if max_items > 0 && selected.len() > max_items {
        selected.truncate(max_items);
    }
    selected
}

// ============================================================================
// HTTP query filters
// ============================================================================

/// Keep workouts whose name equals any of the comma-separated names,
/// case-insensitively.
pub fn filter_by_names(snapshot: &[Workout], names: &str) -> Vec<Workout> {
    let targets: Vec<String> = names
        .split(',')
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    snapshot
        .iter()
        .filter(|w| targets.iter().any(|t| w.name.to_lowercase() == *t))
        .cloned()
        .collect()
}

/// Keep workouts whose active energy is at or above the threshold.
/// Workouts without an energy measurement never match.
pub fn filter_by_energy_threshold(snapshot: &[Workout], threshold: f64) -> Vec<Workout> {
    snapshot
        .iter()
        .filter(|w| {
            w.active_energy_burned
                .as_ref()
                .is_some_and(|e| e.quantity >= threshold)
        })
        .cloned()
        .collect()
}

/// Which side of a date range a bound belongs to.
#[derive(Clone, Copy, Debug)]
pub enum DateBound {
    Start,
    End,
}

/// Keep workouts whose start timestamp falls on the right side of the
/// bound. Workouts with an unparseable start timestamp are dropped, since
/// they cannot be placed in the range.
pub fn filter_by_date(snapshot: &[Workout], bound_date: NaiveDate, bound: DateBound) -> Vec<Workout> {
    snapshot
        .iter()
        .filter(|w| {
            DateTime::parse_from_str(&w.start, EXPORT_TIME_FORMAT)
                .map(|start| match bound {
                    DateBound::Start => start.date_naive() >= bound_date,
                    DateBound::End => start.date_naive() <= bound_date,
                })
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
