//! Logging setup for applications embedding the engine
//!
//! The engine itself only emits `tracing` events; installing a subscriber is
//! the host's choice. These helpers install the usual fmt subscriber.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "docdesk_engine=info";

/// Install a fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `docdesk_engine=info`
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    install(filter)
}

/// Install a fmt subscriber at `level` for the engine, ignoring `RUST_LOG`
///
/// # Errors
///
/// Fails if `level` is not a valid level, or if a global subscriber is
/// already installed.
pub fn init_tracing_at(level: &str) -> Result<()> {
    let filter = EnvFilter::new("").add_directive(
        format!("docdesk_engine={level}")
            .parse()
            .with_context(|| format!("Invalid log level: {level}"))?,
    );
    install(filter)
}

fn install(filter: EnvFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}
