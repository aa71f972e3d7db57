//! Tracing setup for the `bound` binary.
//!
//! The library only emits events (`debug!` per run, `trace!` per cycle,
//! `warn!` for discarded secondary failures). Installing a subscriber is left to
//! binaries; this is the one `bound` uses.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, which only shows secondary
/// failures the runner had to discard.
/// Output: stderr, compact format, so the JSON report on stdout stays clean.
///
/// # Example
/// ```bash
/// # run start, initial signal and stop reason with produced count
/// RUST_LOG=bound::run=debug bound run --accumulated 500
/// # plus one event per cycle and per predicate close
/// RUST_LOG=bound=trace bound run --times 3 --timed 0.5 --any
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
