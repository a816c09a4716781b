// crates/data-lichen-config/src/config.rs
// ============================================================================
// Module: Data Lichen Configuration
// Description: Config sections, file loading, and validation.
// Purpose: Turn `data-lichen.toml` into validated runtime settings.
// Dependencies: data-lichen-core, data-lichen-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Every section has defaults matching a local development setup, so an empty
//! file is a valid config. Unknown keys are rejected.
//! Security posture: config input is untrusted; paths, sizes, and encodings
//! are checked before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use data_lichen_core::PublishMode;
use data_lichen_core::TopicName;
use data_lichen_store_sqlite::SqliteStoreConfig;
use data_lichen_store_sqlite::SqliteStoreMode;
use data_lichen_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "DATA_LICHEN_CONFIG";
/// Config file name used when neither a path nor the env var is given.
pub const DEFAULT_CONFIG_NAME: &str = "data-lichen.toml";
/// Maximum config file size.
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;
/// Maximum total config path length.
const MAX_CONFIG_PATH_LENGTH: usize = 4096;
/// Maximum length of a single config path component.
const MAX_CONFIG_PATH_COMPONENT_LENGTH: usize = 255;
/// Upper bound for `server.max_body_bytes`.
const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Upper bound for any timeout setting.
const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000;
/// Upper bound for `store.read_pool_size`.
const MAX_READ_POOL_SIZE: usize = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Config load and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML for the config model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The config is well-formed but violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Root configuration for the Data Lichen service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataLichenConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Metadata store settings.
    pub store: StoreConfig,
    /// Broker client settings.
    pub broker: BrokerConfig,
    /// Publish pipeline settings.
    pub publish: PublishConfig,
    /// Startup secret provider settings.
    pub secrets: SecretsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Metadata store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// `SQLite` database path.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    pub sync_mode: SqliteSyncMode,
    /// Number of read connections.
    pub read_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let sqlite = SqliteStoreConfig::for_path("metadata.db");
        Self {
            path: sqlite.path,
            busy_timeout_ms: sqlite.busy_timeout_ms,
            journal_mode: sqlite.journal_mode,
            sync_mode: sqlite.sync_mode,
            read_pool_size: sqlite.read_pool_size,
        }
    }
}

impl StoreConfig {
    /// Converts the section into an `SQLite` store configuration.
    #[must_use]
    pub fn to_sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            read_pool_size: self.read_pool_size,
        }
    }
}

/// Broker client implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerKind {
    /// Kafka REST proxy v2 over HTTP.
    #[default]
    KafkaRest,
    /// JSON lines on stdout, for runs without a broker.
    Log,
}

/// Broker client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Broker client implementation.
    pub kind: BrokerKind,
    /// Kafka REST proxy base URL.
    pub proxy_url: String,
    /// Destination topic.
    pub topic: String,
    /// Total request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            kind: BrokerKind::KafkaRest,
            proxy_url: "http://localhost/kafka-rest-proxy".to_string(),
            topic: "data-discovery".to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl BrokerConfig {
    /// Returns the validated topic name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the topic name is not valid.
    pub fn topic_name(&self) -> Result<TopicName, ConfigError> {
        TopicName::parse(self.topic.clone())
            .map_err(|err| ConfigError::Invalid(format!("broker.topic: {err}")))
    }

    /// Returns the parsed proxy URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the URL is not an http(s) URL.
    pub fn proxy_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("broker.proxy_url", &self.proxy_url)
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Publish pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Which records each publish forwards.
    pub mode: PublishMode,
    /// Upper bound on the broker call in milliseconds.
    pub timeout_ms: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::FullResync,
            timeout_ms: 30_000,
        }
    }
}

impl PublishConfig {
    /// Returns the publish timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Secret provider implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretProviderKind {
    /// `HashiCorp` Vault KV v2.
    #[default]
    Vault,
    /// Local JSON file.
    File,
}

/// Startup secret provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider implementation.
    pub provider: SecretProviderKind,
    /// Vault server address.
    pub endpoint: String,
    /// Vault secret path below `/v1/`.
    pub path: String,
    /// Environment variable holding the Vault token.
    pub token_env: String,
    /// Secrets file for the `file` provider.
    pub file: Option<PathBuf>,
    /// Vault request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            provider: SecretProviderKind::Vault,
            endpoint: "http://localhost:8200".to_string(),
            path: "secret/data/data-lichen-secret".to_string(),
            token_env: "VAULT_TOKEN".to_string(),
            file: None,
            timeout_ms: 10_000,
        }
    }
}

impl SecretsConfig {
    /// Returns the parsed Vault endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint is not an http(s) URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("secrets.endpoint", &self.endpoint)
    }

    /// Returns the Vault request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// JSON lines.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Resolves the config path from an explicit path or the env var value.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_CONFIG_NAME),
    }
}

impl DataLichenConfig {
    /// Loads and validates the config.
    ///
    /// When no path is given and neither `DATA_LICHEN_CONFIG` nor
    /// `data-lichen.toml` exists, the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_value = std::env::var(CONFIG_ENV_VAR).ok();
        let implicit = path.is_none() && env_value.is_none();
        let resolved = resolve_config_path(path, env_value);
        if implicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load_from_path(&resolved)
    }

    /// Loads and validates the config at an exact path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        validate_config_path(path)?;
        let text = read_config_text(path)?;
        let config = Self::from_toml_str(&text)?;
        Ok(config)
    }

    /// Parses and validates config text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not valid config TOML or fails
    /// validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_store()?;
        self.validate_broker()?;
        self.validate_publish()?;
        self.validate_secrets()?;
        self.validate_logging()
    }

    /// Validates `[server]`.
    fn validate_server(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<SocketAddr>().map_err(|_| {
            ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.server.bind))
        })?;
        if self.server.max_body_bytes == 0 || self.server.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Validates `[store]`.
    fn validate_store(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must be non-empty".to_string()));
        }
        if self.store.read_pool_size == 0 || self.store.read_pool_size > MAX_READ_POOL_SIZE {
            return Err(ConfigError::Invalid(format!(
                "store.read_pool_size must be between 1 and {MAX_READ_POOL_SIZE}"
            )));
        }
        check_timeout("store.busy_timeout_ms", self.store.busy_timeout_ms)
    }

    /// Validates `[broker]`.
    fn validate_broker(&self) -> Result<(), ConfigError> {
        self.broker.topic_name()?;
        if self.broker.kind == BrokerKind::KafkaRest {
            self.broker.proxy_url()?;
        }
        check_timeout("broker.request_timeout_ms", self.broker.request_timeout_ms)?;
        check_timeout("broker.connect_timeout_ms", self.broker.connect_timeout_ms)
    }

    /// Validates `[publish]`.
    fn validate_publish(&self) -> Result<(), ConfigError> {
        check_timeout("publish.timeout_ms", self.publish.timeout_ms)
    }

    /// Validates `[secrets]`.
    fn validate_secrets(&self) -> Result<(), ConfigError> {
        match self.secrets.provider {
            SecretProviderKind::Vault => {
                self.secrets.endpoint_url()?;
                if self.secrets.path.trim_matches('/').is_empty() {
                    return Err(ConfigError::Invalid("secrets.path must be non-empty".to_string()));
                }
                if self.secrets.token_env.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "secrets.token_env must be non-empty".to_string(),
                    ));
                }
                check_timeout("secrets.timeout_ms", self.secrets.timeout_ms)
            }
            SecretProviderKind::File => match &self.secrets.file {
                Some(path) if !path.as_os_str().is_empty() => Ok(()),
                _ => Err(ConfigError::Invalid(
                    "secrets.file is required for the file provider".to_string(),
                )),
            },
        }
    }

    /// Validates `[logging]`.
    fn validate_logging(&self) -> Result<(), ConfigError> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects overlong config paths before touching the filesystem.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_CONFIG_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_CONFIG_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads the config file as UTF-8 with a size limit.
fn read_config_text(path: &Path) -> Result<String, ConfigError> {
    let file = std::fs::File::open(path)
        .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    let mut bytes = Vec::new();
    file.take(MAX_CONFIG_FILE_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_CONFIG_FILE_BYTES {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    String::from_utf8(bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))
}

/// Parses an http(s) URL with a host.
fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(value).map_err(|err| ConfigError::Invalid(format!("{field} is not a url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{field} must be an http(s) url with a host")));
    }
    Ok(url)
}

/// Checks a timeout is positive and bounded.
fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_TIMEOUT_MS {
        return Err(ConfigError::Invalid(format!("{field} must be between 1 and {MAX_TIMEOUT_MS}")));
    }
    Ok(())
}
