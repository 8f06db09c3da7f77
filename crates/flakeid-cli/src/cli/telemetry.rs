//! Log output for the `flakeid` binary.
//!
//! Logs go to stderr so stdout only ever carries IDs. The level defaults to
//! `info` and follows `RUST_LOG` when set, e.g. `RUST_LOG=flakeid=trace` shows
//! every allocation attempt.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339()),
        )
        .try_init()?;
    Ok(())
}
