// crates/data-lichen-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the process-wide tracing subscriber.
// Purpose: Route structured logs to stderr so stdout stays machine-readable.
// Dependencies: data-lichen-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` takes precedence over `logging.filter`. Logs always go to
//! stderr; command output (snapshots, publish reports, log-broker batches)
//! owns stdout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use data_lichen_config::LogFormat;
use data_lichen_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding the configured filter.
pub const LOG_ENV_VAR: &str = "RUST_LOG";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive did not parse.
    #[error("invalid log filter '{filter}': {reason}")]
    Filter {
        /// Rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Picks the effective filter directive.
#[must_use]
pub fn resolve_filter(env_value: Option<String>, configured: &str) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        _ => configured.to_string(),
    }
}

/// Installs the global subscriber for the given settings.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let directive = resolve_filter(std::env::var(LOG_ENV_VAR).ok(), &config.filter);
    let filter = EnvFilter::try_new(&directive).map_err(|err| LoggingError::Filter {
        filter: directive.clone(),
        reason: err.to_string(),
    })?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| LoggingError::Install(err.to_string()))
}
