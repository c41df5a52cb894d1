//! Diagnostic logging setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Default filter for the interactive modes, which own the terminal
pub const INTERACTIVE_LEVEL: &str = "warn";

/// Default filter for headless training
pub const HEADLESS_LEVEL: &str = "info";

/// Build the filter from `RUST_LOG` when set, else from `level`
pub fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            EnvFilter::try_new(level).map_err(|e| anyhow!("Invalid log level {level:?}: {e}"))
        }
    }
}

/// Install a stderr fmt subscriber. Call once, before any mode starts.
pub fn init(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
