//! Opt-in tracing subscriber setup.
//!
//! The library only emits `tracing` events. Binaries and test harnesses that
//! want to see them call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::GeneralConfig;
use crate::error::{ChronicleError, Result};

/// Build the log filter: `RUST_LOG` if set, otherwise `config.log_level`.
///
/// # Errors
/// Returns `ChronicleError::Config` if the configured level does not parse.
pub fn env_filter(config: &GeneralConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| ChronicleError::Config(format!("log_level: {e}"))),
    }
}

/// Install a global fmt subscriber.
///
/// # Errors
/// Returns `ChronicleError::Config` if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ChronicleError::Config(format!("tracing: {e}")))
}
