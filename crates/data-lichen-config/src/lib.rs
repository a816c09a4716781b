// crates/data-lichen-config/src/lib.rs
// ============================================================================
// Module: Data Lichen Config Library
// Description: Canonical configuration model for the Data Lichen service.
// Purpose: Load and validate `data-lichen.toml`.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! [`DataLichenConfig`] is read from a TOML file resolved from an explicit
//! path, the `DATA_LICHEN_CONFIG` environment variable, or `data-lichen.toml`
//! in the working directory. Loading is size-limited and validation fails
//! closed: a config that loads is safe to hand to the server bootstrap.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::BrokerConfig;
pub use config::BrokerKind;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::DataLichenConfig;
pub use config::LogFormat;
pub use config::LoggingConfig;
pub use config::MAX_CONFIG_FILE_BYTES;
pub use config::PublishConfig;
pub use config::SecretProviderKind;
pub use config::SecretsConfig;
pub use config::ServerConfig;
pub use config::StoreConfig;
pub use config::resolve_config_path;
