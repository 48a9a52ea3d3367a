//! Tracing subscriber setup for embedding binaries and tests.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact stderr subscriber. `RUST_LOG` controls filtering
/// (e.g. `RUST_LOG=lims_queue=debug`); without it only this crate's info
/// events are emitted. Later calls are no-ops, so shared test setup can call
/// this unconditionally.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lims_queue=info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}
