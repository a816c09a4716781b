// crates/data-lichen-server/src/server.rs
// ============================================================================
// Module: Server Bootstrap
// Description: Builds the store, broker, and auth gate from config and serves.
// Purpose: Wire validated config into a running HTTP service.
// Dependencies: axum, data-lichen-{broker, config, core, secrets, store-sqlite}
// ============================================================================

//! ## Overview
//! Startup order: fetch secrets, build the auth gate, open the store, build the
//! broker client and publish pipeline, then bind. A secret fetch failure is
//! fatal and aborts before anything is served.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use data_lichen_broker::KafkaRestClient;
use data_lichen_broker::KafkaRestConfig;
use data_lichen_broker::LogBrokerClient;
use data_lichen_config::BrokerConfig;
use data_lichen_config::BrokerKind;
use data_lichen_config::DataLichenConfig;
use data_lichen_config::SecretProviderKind;
use data_lichen_config::SecretsConfig;
use data_lichen_config::StoreConfig;
use data_lichen_core::MetadataRegistry;
use data_lichen_core::PublishPipeline;
use data_lichen_core::SharedBrokerClient;
use data_lichen_core::SharedMetadataStore;
use data_lichen_secrets::FileSecretProvider;
use data_lichen_secrets::SecretProvider;
use data_lichen_secrets::VaultKvConfig;
use data_lichen_secrets::VaultKvProvider;
use data_lichen_store_sqlite::SqliteMetadataStore;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;
use tracing::warn;

use crate::auth::AuthGateSettings;
use crate::auth::BearerTokenGate;
use crate::auth::StderrAuditSink;
use crate::routes::AppState;
use crate::routes::build_router;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server bootstrap and runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Secret fetch errors (fatal at startup).
    #[error("secret fetch failed: {0}")]
    Secrets(String),
    /// Component initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Data Lichen HTTP server instance.
pub struct DataLichenServer {
    /// Bind address.
    bind: SocketAddr,
    /// Maximum request body size.
    max_body_bytes: usize,
    /// Route state.
    state: AppState,
}

impl DataLichenServer {
    /// Builds a server from config, fetching secrets and opening the store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when any startup step fails.
    pub async fn bootstrap(config: &DataLichenConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let token = read_vault_token(&config.secrets);
        let provider = build_secret_provider(&config.secrets, token)?;
        let gate = load_auth_gate(provider.as_ref()).await?;
        let store_config = config.store.clone();
        let store = tokio::task::spawn_blocking(move || open_store(&store_config))
            .await
            .map_err(|err| ServerError::Init(format!("store open join failed: {err}")))??;
        let broker = build_broker(&config.broker)?;
        let pipeline = build_pipeline(config, store.clone(), broker)?;
        let state = AppState::new(
            MetadataRegistry::new(store),
            pipeline,
            Arc::new(gate),
            Arc::new(StderrAuditSink),
        );
        Self::from_state(config, state)
    }

    /// Builds a server around pre-built route state.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] when the bind address is invalid.
    pub fn from_state(config: &DataLichenConfig, state: AppState) -> Result<Self, ServerError> {
        let bind = config
            .server
            .bind
            .parse()
            .map_err(|_| ServerError::Config("invalid bind address".to_string()))?;
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            state,
        })
    }

    /// Returns the API router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.max_body_bytes)
    }

    /// Binds the configured address and serves until the process stops.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when serving fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map_err(|err| ServerError::Transport(format!("listener address unavailable: {err}")))?;
        info!(bind = %local, "data lichen listening");
        let app = self.router();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

// ============================================================================
// SECTION: Component Builders
// ============================================================================

/// Reads the Vault token from the configured environment variable.
#[must_use]
pub fn read_vault_token(config: &SecretsConfig) -> Option<String> {
    std::env::var(&config.token_env).ok().filter(|token| !token.trim().is_empty())
}

/// Builds the configured secret provider.
///
/// # Errors
///
/// Returns [`ServerError::Secrets`] when the provider cannot be constructed,
/// including a missing Vault token.
pub fn build_secret_provider(
    config: &SecretsConfig,
    vault_token: Option<String>,
) -> Result<Box<dyn SecretProvider>, ServerError> {
    match config.provider {
        SecretProviderKind::Vault => {
            let token = vault_token.ok_or_else(|| {
                ServerError::Secrets(format!(
                    "vault token environment variable {} is not set",
                    config.token_env
                ))
            })?;
            let endpoint = config.endpoint_url().map_err(|err| ServerError::Config(err.to_string()))?;
            let provider = VaultKvProvider::new(VaultKvConfig {
                endpoint,
                path: config.path.clone(),
                token,
                timeout: config.timeout(),
            })
            .map_err(|err| ServerError::Secrets(err.to_string()))?;
            Ok(Box::new(provider))
        }
        SecretProviderKind::File => {
            let path = config.file.clone().ok_or_else(|| {
                ServerError::Config("secrets.file is required for the file provider".to_string())
            })?;
            Ok(Box::new(FileSecretProvider::new(path)))
        }
    }
}

/// Fetches secrets once and builds the bearer token gate.
///
/// # Errors
///
/// Returns [`ServerError::Secrets`] when the fetch fails or the bundle does
/// not hold auth gate settings.
pub async fn load_auth_gate(provider: &dyn SecretProvider) -> Result<BearerTokenGate, ServerError> {
    let bundle = provider.fetch().await.map_err(|err| ServerError::Secrets(err.to_string()))?;
    let settings =
        AuthGateSettings::from_bundle(&bundle).map_err(|err| ServerError::Secrets(err.to_string()))?;
    let gate = BearerTokenGate::from_settings(settings);
    if gate.token_count() == 0 {
        warn!(provider = provider.name(), "no bearer tokens configured; protected routes deny all");
    }
    Ok(gate)
}

/// Opens the `SQLite` metadata store.
///
/// # Errors
///
/// Returns [`ServerError::Init`] when the store cannot be opened.
pub fn open_store(config: &StoreConfig) -> Result<SharedMetadataStore, ServerError> {
    let store = SqliteMetadataStore::open(config.to_sqlite_config())
        .map_err(|err| ServerError::Init(err.to_string()))?;
    info!(path = %config.path.display(), "metadata store opened");
    Ok(SharedMetadataStore::from_store(store))
}

/// Builds the configured broker client.
///
/// # Errors
///
/// Returns [`ServerError`] when the proxy URL or HTTP client is invalid.
pub fn build_broker(config: &BrokerConfig) -> Result<SharedBrokerClient, ServerError> {
    match config.kind {
        BrokerKind::KafkaRest => {
            let proxy_url = config.proxy_url().map_err(|err| ServerError::Config(err.to_string()))?;
            let client = KafkaRestClient::new(&KafkaRestConfig {
                proxy_url,
                request_timeout: config.request_timeout(),
                connect_timeout: config.connect_timeout(),
            })
            .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(SharedBrokerClient::from_client(client))
        }
        BrokerKind::Log => Ok(SharedBrokerClient::from_client(LogBrokerClient::stdout())),
    }
}

/// Builds the publish pipeline for the configured topic and mode.
///
/// # Errors
///
/// Returns [`ServerError::Config`] when the topic name is invalid.
pub fn build_pipeline(
    config: &DataLichenConfig,
    store: SharedMetadataStore,
    broker: SharedBrokerClient,
) -> Result<PublishPipeline, ServerError> {
    let topic = config.broker.topic_name().map_err(|err| ServerError::Config(err.to_string()))?;
    Ok(PublishPipeline::new(store, broker, topic)
        .with_mode(config.publish.mode)
        .with_timeout(config.publish.timeout()))
}
