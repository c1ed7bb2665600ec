// ABOUTME: Logging initialization for applications embedding the engine
// ABOUTME: Builds a tracing fmt subscriber honoring RUST_LOG, defaulting to info

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
