//! Tracing setup for hosts embedding the engine.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber with `RUST_LOG` filtering.
///
/// Falls back to `info` when `RUST_LOG` is unset. Safe to call more than
/// once; later calls are no-ops.
pub fn init_tracing() {
    init_tracing_with_filter("info");
}

/// Initializes tracing with an explicit default filter directive.
pub fn init_tracing_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
