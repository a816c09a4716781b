// crates/data-lichen-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for data-lichen-config tests.
// Purpose: Build baseline configs and assert on validation messages.
// Dependencies: data-lichen-config
// ============================================================================

//! ## Overview
//! Provides a baseline config and message assertions shared by config tests.

#![allow(dead_code, reason = "Common module may have unused helpers.")]

use data_lichen_config::ConfigError;
use data_lichen_config::DataLichenConfig;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Returns the default config, which must validate.
pub fn minimal_config() -> Result<DataLichenConfig, ConfigError> {
    let config = DataLichenConfig::default();
    config.validate()?;
    Ok(config)
}

/// Asserts a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
