//! Tracing subscriber for tests
//!
//! Output is captured by the test harness and filtered with `RUST_LOG`
//! (default `warn`).

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Another harness may already have installed a global subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Install the test subscriber once per process.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
