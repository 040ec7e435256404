//! Source directory scanning and filename date extraction.
//!
//! Export files are recognized by the `.json` extension and keyed by the
//! last `YYYY-MM-DD` token in the file name. Range-named exports like
//! `export-2024-10-01-2024-11-05.json` are keyed by the range end.

use crate::{Error, Result, DATE_FORMAT};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date token pattern"));

/// A source file recognized by extension together with its effective date.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub path: PathBuf,
    pub file_date: NaiveDate,
}

/// List candidate export files in a directory.
///
/// Entries without the `.json` extension or without an extractable,
/// calendar-valid date token are skipped silently; they are not errors.
/// No ordering is guaranteed. An unlistable directory is fatal.
pub fn list_candidates(dir: &Path) -> Result<Vec<Candidate>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::DirectoryUnreadable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::DirectoryUnreadable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match extract_file_date(name) {
            Some(file_date) => candidates.push(Candidate { path, file_date }),
            None => {
                tracing::debug!("Skipping {:?}: no usable date token in name", path);
            }
        }
    }

    tracing::debug!("Found {} candidate files in {:?}", candidates.len(), dir);
    Ok(candidates)
}

/// Extract the effective date from a file name: the last `YYYY-MM-DD`
/// token. A last token that is not a valid calendar date disqualifies
/// the file; earlier tokens are never consulted.
pub fn extract_file_date(name: &str) -> Option<NaiveDate> {
    let token = DATE_TOKEN.find_iter(name).last()?;
    NaiveDate::parse_from_str(token.as_str(), DATE_FORMAT).ok()
}
