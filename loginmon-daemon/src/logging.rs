//! Global `tracing` subscriber for the daemon.
//!
//! The `[general]` config section picks the level and the output format.
//! A `RUST_LOG` directive in the environment overrides the configured level.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use loginmon_core::config::GeneralConfig;

/// Install the global subscriber. Call once, before the first event.
///
/// `json` writes one flattened JSON object per event. `pretty` is the
/// multi-line human format.
///
/// # Errors
///
/// Fails on an unknown format, an unparseable level, or when a global
/// subscriber is already installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(&config.log_level)?);

    let installed = match config.log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
        "pretty" => registry.with(fmt::layer().pretty()).try_init(),
        other => anyhow::bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };

    installed.with_context(|| format!("failed to install {} subscriber", config.log_format))
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{level}'"))
}
