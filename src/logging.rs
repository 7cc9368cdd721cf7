//! Harness-side logging setup.
//!
//! Framework code logs through `tracing`. Log events emitted by the server under test are
//! captured separately by [`crate::logs::LogCapture`] and never reach this subscriber.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a global fmt subscriber for the test binary.
///
/// Honours `RUST_LOG` and defaults to `off` so test output stays quiet unless asked for.
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
