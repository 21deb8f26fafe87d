//! Development-time tracing for the synthesis loop.
//!
//! Diagnostics go to stderr and are filtered via `RUST_LOG`. The run's
//! result message is printed to stdout by the CLI and is unaffected by the
//! filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `synth=info` so attempt progress is visible.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=synth=debug synth adder_test.rs out
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("synth=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
