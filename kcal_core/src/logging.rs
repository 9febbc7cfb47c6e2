//! Tracing setup for the `kcal` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log at INFO unless `RUST_LOG` says otherwise
pub fn init() {
    init_with_level("info")
}

/// Log to stderr at `default_level`; `RUST_LOG` takes precedence
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Debug-level logs routed through the test harness
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
