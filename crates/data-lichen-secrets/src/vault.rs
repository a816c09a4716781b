// crates/data-lichen-secrets/src/vault.rs
// ============================================================================
// Module: Vault KV Secret Provider
// Description: Reads a KV v2 secret from HashiCorp Vault over HTTP.
// Purpose: Supply startup secrets from a Vault server.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`VaultKvProvider`] issues `GET {endpoint}/v1/{path}` with the
//! `X-Vault-Token` header and returns the object at `data.data`.
//! Invariants:
//! - Redirects are rejected.
//! - Response bodies are capped at [`MAX_VAULT_RESPONSE_BYTES`].
//! - The token is never logged or included in errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::traits::SecretBundle;
use crate::traits::SecretFetchError;
use crate::traits::SecretProvider;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the Vault client token.
const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";
/// Maximum Vault response size.
pub const MAX_VAULT_RESPONSE_BYTES: usize = 256 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Vault KV v2 provider configuration.
#[derive(Clone)]
pub struct VaultKvConfig {
    /// Vault server address, for example `http://localhost:8200`.
    pub endpoint: Url,
    /// Secret path below `/v1/`, for example `secret/data/data-lichen-secret`.
    pub path: String,
    /// Vault client token.
    pub token: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for VaultKvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultKvConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("path", &self.path)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Outer KV v2 read response.
#[derive(Deserialize)]
struct KvReadResponse {
    /// Secret envelope.
    data: KvData,
}

/// KV v2 secret envelope.
#[derive(Deserialize)]
struct KvData {
    /// Secret key/value pairs.
    data: Value,
}

// ============================================================================
// SECTION: Provider
// ============================================================================

/// Secret provider backed by a Vault KV v2 engine.
pub struct VaultKvProvider {
    /// Reqwest client instance.
    client: Client,
    /// Full secret read URL.
    url: String,
    /// Secret path, used in error messages.
    path: String,
    /// Vault client token.
    token: String,
}

impl VaultKvProvider {
    /// Builds a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SecretFetchError::ProviderNotAvailable`] when the token or path
    /// is empty or the HTTP client cannot be constructed.
    pub fn new(config: VaultKvConfig) -> Result<Self, SecretFetchError> {
        if config.token.trim().is_empty() {
            return Err(SecretFetchError::ProviderNotAvailable("vault token is empty".to_string()));
        }
        let path = config.path.trim_matches('/').to_string();
        if path.is_empty() {
            return Err(SecretFetchError::ProviderNotAvailable("vault path is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| SecretFetchError::ProviderNotAvailable(err.to_string()))?;
        let base = config.endpoint.as_str().trim_end_matches('/');
        Ok(Self {
            client,
            url: format!("{base}/v1/{path}"),
            path,
            token: config.token,
        })
    }

    /// Returns the secret read URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SecretProvider for VaultKvProvider {
    fn name(&self) -> &'static str {
        "vault"
    }

    async fn fetch(&self) -> Result<SecretBundle, SecretFetchError> {
        let mut response = self
            .client
            .get(&self.url)
            .header(VAULT_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|err| SecretFetchError::ReadError(err.without_url().to_string()))?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(SecretFetchError::NotFound(self.path.clone())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SecretFetchError::PermissionDenied(self.path.clone()));
            }
            status => {
                return Err(SecretFetchError::ReadError(format!("vault returned status {status}")));
            }
        }
        let mut body = Vec::new();
        while let Some(chunk) =
            response.chunk().await.map_err(|err| SecretFetchError::ReadError(err.to_string()))?
        {
            if body.len() + chunk.len() > MAX_VAULT_RESPONSE_BYTES {
                return Err(SecretFetchError::Malformed(format!(
                    "vault response exceeds {MAX_VAULT_RESPONSE_BYTES} bytes"
                )));
            }
            body.extend_from_slice(&chunk);
        }
        let parsed: KvReadResponse = serde_json::from_slice(&body).map_err(|_| {
            SecretFetchError::Malformed("vault response is not a KV v2 read".to_string())
        })?;
        let bundle = SecretBundle::from_value(parsed.data.data)?;
        info!(provider = "vault", path = %self.path, "secrets loaded");
        Ok(bundle)
    }
}
