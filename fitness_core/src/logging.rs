//! Logging infrastructure shared by the fitness binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing with env-filter support.
///
/// Defaults to `info`; override with the `RUST_LOG` environment variable.
/// Recoverable per-file skips during sync surface as `warn` events here,
/// so they stay out of the normal report output.
pub fn init() {
    init_with_level("info")
}

/// Initialize tracing with a specific default level.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
