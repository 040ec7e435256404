//! Error types for the fitness_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitness_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache file exists but cannot be read or parsed. Fatal to a sync
    /// cycle: reprocessing the whole source directory on a corrupt cache
    /// would have undefined merge semantics.
    #[error("cache unreadable at {path}: {reason}")]
    CacheUnreadable { path: PathBuf, reason: String },

    /// Source directory cannot be listed. Fatal to a sync cycle.
    #[error("source directory unreadable at {path}: {reason}")]
    DirectoryUnreadable { path: PathBuf, reason: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
