//! Tracing/logging initialization.
//!
//! JSON-formatted structured logs, filtered through `RUST_LOG` with an
//! `info` default. Snapshot swaps and plan runs log at info; per-SKU
//! computation detail stays at debug.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
