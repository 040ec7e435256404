//! Incremental cache synchronization engine.
//!
//! One sync cycle: load cache → scan directory → select files dated
//! strictly after the watermark → parse and merge each → persist the
//! updated cache iff anything was merged.
//!
//! A malformed or unreadable source file never aborts the cycle; it is
//! skipped and reconsidered on the next cycle while its date remains
//! after the (unchanged) watermark. Cache corruption and an unlistable
//! source directory are fatal.

use crate::scanner::list_candidates;
use crate::{Dataset, HealthData, Result};
use chrono::NaiveDate;
use std::path::Path;

/// The result of one sync cycle.
#[derive(Clone, Debug)]
pub struct SyncOutcome {
    /// The merged dataset: cache contents plus any newly folded files.
    pub dataset: Dataset,
    /// The watermark after the cycle. Never earlier than the watermark
    /// the cycle started with.
    pub watermark: Option<NaiveDate>,
    /// Whether the cache file was rewritten.
    pub changed: bool,
    /// Number of source files successfully merged this cycle.
    pub merged_files: usize,
}

/// Run one synchronization cycle.
///
/// The cache's watermark is the cutoff: only candidates dated strictly
/// after it are read. An absent cache bootstraps an empty dataset with no
/// cutoff, so every candidate qualifies. The cache file is rewritten only
/// when at least one file merged, which makes a no-op cycle leave the
/// cache byte-for-byte untouched.
pub fn synchronize(cache_path: &Path, source_dir: &Path) -> Result<SyncOutcome> {
    let cache = HealthData::load(cache_path)?;
    let cutoff = cache.last_updated;
    let mut dataset = cache.data;

    let candidates = list_candidates(source_dir)?;

    let mut merged_files = 0usize;
    let mut max_merged_date: Option<NaiveDate> = None;

    for candidate in candidates {
        if let Some(cutoff) = cutoff {
            if candidate.file_date <= cutoff {
                continue;
            }
        }

        let contents = match std::fs::read_to_string(&candidate.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Skipping unreadable file {:?}: {}", candidate.path, e);
                continue;
            }
        };

        let export: HealthData = match serde_json::from_str(&contents) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Skipping malformed file {:?}: {}", candidate.path, e);
                continue;
            }
        };

        tracing::info!(
            "Processing new data from: {} ({:?})",
            candidate.file_date,
            candidate.path.file_name().unwrap_or_default()
        );
        dataset.merge(export.data);
        merged_files += 1;
        max_merged_date = Some(match max_merged_date {
            Some(d) => d.max(candidate.file_date),
            None => candidate.file_date,
        });
    }

    // max(cutoff, max merged date); equals the old cutoff when nothing merged
    let watermark = match (cutoff, max_merged_date) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };

    let changed = merged_files > 0;
    if changed {
        let updated = HealthData {
            data: dataset.clone(),
            last_updated: watermark,
        };
        updated.save(cache_path)?;
        tracing::info!(
            "Cache updated with data through {:?} ({} files merged)",
            watermark,
            merged_files
        );
    } else {
        tracing::debug!("No new files; cache left untouched");
    }

    Ok(SyncOutcome {
        dataset,
        watermark,
        changed,
        merged_files,
    })
}
