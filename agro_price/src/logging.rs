//! Tracing subscriber setup
//!
//! The log level is read from `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=agro_price=debug`.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber
///
/// # Example
/// ```no_run
/// agro_price::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Install a debug-level subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
