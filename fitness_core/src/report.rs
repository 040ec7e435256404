//! Text rendering of workout and metric snapshots.
//!
//! Rendering produces a `String` so callers decide where it goes and the
//! layer stays testable. The [`RecordSet`] variant replaces runtime type
//! inspection: a snapshot is either workouts or metrics, statically.

use crate::query::{select_metrics, select_workouts, sort_workouts, SortKey, WorkoutFilter};
use crate::{Metric, Workout, EXPORT_TIME_FORMAT};
use chrono::DateTime;
use std::collections::HashSet;
use std::fmt::Write;

/// Default display format for timestamps.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A read snapshot of one record collection.
#[derive(Clone, Debug)]
pub enum RecordSet {
    Workouts(Vec<Workout>),
    Metrics(Vec<Metric>),
}

/// Options controlling report output.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Strftime format for displayed timestamps.
    pub time_format: String,
    /// Maximum number of items to render (0 for all).
    pub max_items: usize,
    /// Tabular one-line-per-workout mode.
    pub compact: bool,
    /// Optional single-record predicate.
    pub filter: Option<WorkoutFilter>,
    /// Field names to suppress (lowercased on use).
    pub exclude_fields: Vec<String>,
    /// Field names to keep; empty means all.
    pub include_fields: Vec<String>,
    /// Optional sort key, with direction.
    pub sort: Option<SortKey>,
    pub descending: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.into(),
            max_items: 0,
            compact: false,
            filter: None,
            exclude_fields: Vec::new(),
            include_fields: Vec::new(),
            sort: None,
            descending: false,
        }
    }
}

impl ReportOptions {
    /// The effective set of suppressed field names: the exclude list, plus
    /// everything not named by a non-empty include list.
    fn excluded(&self) -> HashSet<String> {
        const ALL_FIELDS: [&str; 11] = [
            "name",
            "id",
            "start",
            "end",
            "time",
            "duration",
            "distance",
            "energy",
            "intensity",
            "location",
            "temperature",
        ];

        let mut excluded: HashSet<String> = self
            .exclude_fields
            .iter()
            .map(|f| f.trim().to_lowercase())
            .collect();

        if !self.include_fields.is_empty() {
            let included: HashSet<String> = self
                .include_fields
                .iter()
                .map(|f| f.trim().to_lowercase())
                .collect();
            for field in ALL_FIELDS {
                if !included.contains(field) {
                    excluded.insert(field.into());
                }
            }
        }

        excluded
    }
}

/// Render a record set according to the options.
pub fn render(records: &RecordSet, opts: &ReportOptions) -> String {
    match records {
        RecordSet::Workouts(workouts) => render_workouts(workouts, opts),
        RecordSet::Metrics(metrics) => render_metrics(metrics, opts),
    }
}

/// Render a workout snapshot, detailed or compact.
pub fn render_workouts(snapshot: &[Workout], opts: &ReportOptions) -> String {
    let mut workouts = select_workouts(snapshot, opts.filter.as_ref(), 0);
    if let Some(key) = opts.sort {
        sort_workouts(&mut workouts, key, opts.descending);
    }
    if opts.max_items > 0 && workouts.len() > opts.max_items {
        workouts.truncate(opts.max_items);
    }

    if opts.compact {
        render_workouts_compact(&workouts, opts)
    } else {
        render_workouts_detailed(&workouts, opts)
    }
}

fn render_workouts_detailed(workouts: &[Workout], opts: &ReportOptions) -> String {
    let excluded = opts.excluded();
    let show = |field: &str| !excluded.contains(field);
    let show_time = |field: &str| show(field) && show("time");

    let mut out = String::new();
    out.push_str("\nWorkout Data:\n");
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for (i, w) in workouts.iter().enumerate() {
        if i > 0 {
            out.push_str(&"-".repeat(80));
            out.push('\n');
        }

        if show("name") {
            let _ = writeln!(out, "Workout: {}", w.name);
        }
        if show("id") {
            let _ = writeln!(out, "ID: {}", w.id);
        }
        if show_time("start") {
            if let Some(start) = format_timestamp(&w.start, &opts.time_format) {
                let _ = writeln!(out, "Start: {}", start);
            }
        }
        if show_time("end") {
            if let Some(end) = format_timestamp(&w.end, &opts.time_format) {
                let _ = writeln!(out, "End: {}", end);
            }
        }
        if show("duration") {
            let _ = writeln!(out, "Duration: {}", format_duration(w.duration_seconds));
        }
        if show("distance") {
            if let Some(d) = &w.distance {
                let _ = writeln!(out, "Distance: {:.2} {}", d.quantity, d.units);
            }
        }
        if show("energy") {
            if let Some(e) = &w.active_energy_burned {
                let _ = writeln!(out, "Energy Burned: {:.2} {}", e.quantity, e.units);
            }
        }
        if show("intensity") {
            if let Some(i) = &w.intensity {
                let _ = writeln!(out, "Intensity: {:.2} {}", i.quantity, i.units);
            }
        }
        if show("location") {
            if let Some(l) = &w.location {
                let _ = writeln!(out, "Location: {}", l);
            }
        }
        if show("temperature") {
            if let Some(t) = &w.temperature {
                let _ = writeln!(out, "Temperature: {:.1} {}", t.quantity, t.units);
            }
        }
        out.push('\n');
    }

    out
}

fn render_workouts_compact(workouts: &[Workout], opts: &ReportOptions) -> String {
    let excluded = opts.excluded();
    let show_name = !excluded.contains("name");
    let show_start = !excluded.contains("start") && !excluded.contains("time");
    let show_duration = !excluded.contains("duration");
    let show_distance = !excluded.contains("distance");
    let show_energy = !excluded.contains("energy");

    let mut headers = Vec::new();
    if show_name {
        headers.push(format!("{:<20}", "Name"));
    }
    if show_start {
        headers.push(format!("{:<19}", "Start"));
    }
    if show_duration {
        headers.push(format!("{:<8}", "Duration"));
    }
    if show_distance {
        headers.push(format!("{:<10}", "Distance"));
    }
    if show_energy {
        headers.push(format!("{:<10}", "Energy"));
    }

    let header_line = headers.join(" ");
    let mut out = String::new();
    let _ = writeln!(out, "{}", header_line);
    let _ = writeln!(out, "{}", "-".repeat(header_line.len()));

    for w in workouts {
        let mut fields = Vec::new();
        if show_name {
            fields.push(format!("{:<20}", truncate(&w.name, 20)));
        }
        if show_start {
            let start = format_timestamp(&w.start, "%Y-%m-%d %H:%M").unwrap_or_else(|| "-".into());
            fields.push(format!("{:<19}", start));
        }
        if show_duration {
            fields.push(format!("{:<8}", format_duration(w.duration_seconds)));
        }
        if show_distance {
            let distance = w
                .distance
                .as_ref()
                .map(|d| format!("{:.1}{}", d.quantity, d.units))
                .unwrap_or_else(|| "-".into());
            fields.push(format!("{:<10}", distance));
        }
        if show_energy {
            let energy = w
                .active_energy_burned
                .as_ref()
                .map(|e| format!("{:.0}{}", e.quantity, e.units))
                .unwrap_or_else(|| "-".into());
            fields.push(format!("{:<10}", energy));
        }
        let _ = writeln!(out, "{}", fields.join(" "));
    }

    out
}

/// Render a metric snapshot: one block per metric with dated samples.
pub fn render_metrics(snapshot: &[Metric], opts: &ReportOptions) -> String {
    let name_filter = opts.filter.as_ref().map(|f| f.value.as_str());
    let metrics = select_metrics(snapshot, name_filter, opts.max_items);

    let mut out = String::new();
    for (i, m) in metrics.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "Metric: {} ({})", m.name, m.units);
        let _ = writeln!(out, "{}", "-".repeat(40));

        for sample in &m.samples {
            let date = DateTime::parse_from_rfc3339(&sample.date)
                .map(|d| d.format(&opts.time_format).to_string())
                .unwrap_or_else(|_| sample.date.clone());
            let _ = writeln!(out, "{}: {:.2}", date, sample.quantity);
        }
    }

    out
}

/// Render seconds as `MM:SS`.
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as i64;
    let remaining = (seconds % 60.0).round() as i64;
    format!("{:02}:{:02}", minutes, remaining)
}

fn format_timestamp(raw: &str, display_format: &str) -> Option<String> {
    DateTime::parse_from_str(raw, EXPORT_TIME_FORMAT)
        .ok()
        .map(|t| t.format(display_format).to_string())
}

fn truncate(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        s.to_string()
    } else {
        let cut: String = s.chars().take(n.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
