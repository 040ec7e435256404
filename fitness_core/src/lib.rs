#![forbid(unsafe_code)]

//! Core domain model and sync engine for the fitness health-export tool.
//!
//! This crate provides:
//! - Domain types (workouts, metrics, the merged dataset)
//! - The durable cache codec (atomic load/save with a watermark date)
//! - Directory scanning with filename date extraction
//! - The incremental cache synchronization engine
//! - Read-only query, report, and aggregation layers

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod cache;
pub mod scanner;
pub mod sync;
pub mod query;
pub mod report;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use scanner::{list_candidates, Candidate};
pub use sync::{synchronize, SyncOutcome};
pub use query::{FilterKind, SortKey, WorkoutFilter};
pub use report::{render, RecordSet, ReportOptions};
