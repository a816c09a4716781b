// crates/data-lichen-secrets/src/traits.rs
// ============================================================================
// Module: Secret Provider Interface
// Description: Provider trait, secret bundle, and fetch errors.
// Purpose: Define the contract shared by all secret backends.
// Dependencies: async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Providers must be thread-safe and must never log, print, or include secret
//! values in error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors from secret fetch operations.
///
/// # Invariants
/// - Messages never include secret values.
#[derive(Debug, Error)]
pub enum SecretFetchError {
    /// No secret exists at the configured location.
    #[error("secret not found: {0}")]
    NotFound(String),
    /// The provider refused access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The provider could not be reached or read.
    #[error("failed to read secret: {0}")]
    ReadError(String),
    /// The provider returned data in an unexpected shape.
    #[error("malformed secret payload: {0}")]
    Malformed(String),
    /// The provider is not configured.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

// ============================================================================
// SECTION: Bundle
// ============================================================================

/// Named secrets returned by a provider.
#[derive(Clone, Default, PartialEq)]
pub struct SecretBundle {
    /// Secret values keyed by name.
    values: Map<String, Value>,
}

impl SecretBundle {
    /// Wraps a JSON object of secrets.
    #[must_use]
    pub const fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
        }
    }

    /// Builds a bundle from a JSON value that must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`SecretFetchError::Malformed`] when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, SecretFetchError> {
        match value {
            Value::Object(values) => Ok(Self::new(values)),
            _ => Err(SecretFetchError::Malformed("expected a JSON object".to_string())),
        }
    }

    /// Returns a string secret by name.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Returns the secret names, never the values.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns true when the bundle holds no secrets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserializes the bundle into a typed settings structure.
    ///
    /// # Errors
    ///
    /// Returns [`SecretFetchError::Malformed`] when the bundle does not match `T`.
    /// The message names the failing field but not its value.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, SecretFetchError> {
        serde_json::from_value(Value::Object(self.values.clone())).map_err(|err| {
            SecretFetchError::Malformed(format!(
                "secret bundle does not match expected settings (line {}, column {})",
                err.line(),
                err.column()
            ))
        })
    }
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBundle")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Provider Trait
// ============================================================================

/// Source of the startup secret bundle.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Returns a short provider label for logs.
    fn name(&self) -> &'static str;

    /// Fetches the secret bundle.
    ///
    /// # Errors
    ///
    /// Returns [`SecretFetchError`] when the secret cannot be read or decoded.
    async fn fetch(&self) -> Result<SecretBundle, SecretFetchError>;
}

// ============================================================================
// SECTION: Tests
// ============================================================================
