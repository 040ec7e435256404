//! Durable cache persistence with atomic writes and file locking.
//!
//! The cache file is the single durable artifact of the sync engine: the
//! cumulative dataset plus the watermark date. Loads distinguish "absent"
//! (bootstrap with an empty dataset) from "present but unreadable" (fatal),
//! and saves never leave a partially-written file visible to readers.

use crate::{Error, HealthData, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl HealthData {
    /// Load the cache file with shared locking.
    ///
    /// An absent file is the first-run bootstrap path: returns an empty
    /// dataset with no watermark, so the next sync cycle processes every
    /// candidate file. A file that exists but cannot be read or parsed is
    /// a fatal [`Error::CacheUnreadable`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No cache file at {:?}, starting with empty dataset", path);
            return Ok(Self::default());
        }

        let file = File::open(path).map_err(|e| Error::CacheUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        file.lock_shared()?;
        let mut contents = String::new();
        let read_result = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        read_result.map_err(|e| Error::CacheUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let cache: HealthData =
            serde_json::from_str(&contents).map_err(|e| Error::CacheUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            "Loaded cache from {:?} ({} workouts, {} metrics, watermark {:?})",
            path,
            cache.data.workouts.len(),
            cache.data.metrics.len(),
            cache.last_updated
        );
        Ok(cache)
    }

    /// Save the cache file with exclusive locking.
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "cache path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            // Pretty output keeps the cache inspectable alongside the raw
            // export files; serde_json round-trips f64 quantities exactly.
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the old cache file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved cache to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dataset, Measurement, Workout};
    use chrono::NaiveDate;

    fn workout_with_distance(id: &str, miles: f64) -> Workout {
        Workout {
            id: id.into(),
            name: "Outdoor Cycle".into(),
            start: "2024-01-05 08:00:00 -0500".into(),
            end: "2024-01-05 09:00:00 -0500".into(),
            duration_seconds: 3600.0,
            distance: Some(Measurement {
                units: "mi".into(),
                quantity: miles,
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
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_path = temp_dir.path().join("cache.json");

        let cache = HealthData {
            data: Dataset {
                workouts: vec![workout_with_distance("w1", 14.5)],
                metrics: vec![],
            },
            last_updated: Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
        };

        cache.save(&cache_path).unwrap();
        let loaded = HealthData::load(&cache_path).unwrap();

        assert_eq!(loaded.data.workouts.len(), 1);
        assert_eq!(loaded.last_updated, cache.last_updated);
    }

    #[test]
    fn test_load_absent_bootstraps_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_path = temp_dir.path().join("nonexistent.json");

        let cache = HealthData::load(&cache_path).unwrap();
        assert!(cache.data.is_empty());
        assert!(cache.last_updated.is_none());
    }

    #[test]
    fn test_load_corrupt_cache_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_path = temp_dir.path().join("cache.json");
        std::fs::write(&cache_path, "{ not json }}}").unwrap();

        let err = HealthData::load(&cache_path).unwrap_err();
        assert!(matches!(err, Error::CacheUnreadable { .. }));
    }

    #[test]
    fn test_float_quantities_round_trip_exactly() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_path = temp_dir.path().join("cache.json");

        let quantity = 12.300000000000001_f64;
        let cache = HealthData {
            data: Dataset {
                workouts: vec![workout_with_distance("w1", quantity)],
                metrics: vec![],
            },
            last_updated: None,
        };

        cache.save(&cache_path).unwrap();
        let loaded = HealthData::load(&cache_path).unwrap();
        assert_eq!(
            loaded.data.workouts[0].distance.as_ref().unwrap().quantity,
            quantity
        );
    }

    #[test]
    fn test_atomic_save_leaves_no_stray_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache_path = temp_dir.path().join("cache.json");

        HealthData::default().save(&cache_path).unwrap();

        assert!(cache_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "cache.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only cache.json, found extras: {:?}",
            extras
        );
    }
}
