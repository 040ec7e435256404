//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitness/config.toml`.
//! Every field has a default, so a partial (or absent) file is fine.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Data location configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory watched for dated export files.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Durable cache file holding the merged dataset and watermark.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            cache_path: default_cache_path(),
        }
    }
}

/// Report display configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
        }
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("fitness")
}

fn default_source_dir() -> PathBuf {
    default_data_dir().join("health-data")
}

fn default_cache_path() -> PathBuf {
    default_data_dir().join("cache.json")
}

fn default_time_format() -> String {
    crate::report::DEFAULT_TIME_FORMAT.into()
}

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("fitness").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data.cache_path.ends_with("cache.json"));
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.display.time_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[data]
source_dir = "/exports/health"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data.source_dir, PathBuf::from("/exports/health"));
        assert!(config.data.cache_path.ends_with("cache.json")); // default
        assert_eq!(config.server.bind, "127.0.0.1:8080"); // default
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nbind = \"0.0.0.0:9090\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9090");
    }
}
