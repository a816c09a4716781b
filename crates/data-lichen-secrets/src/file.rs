// crates/data-lichen-secrets/src/file.rs
// ============================================================================
// Module: File Secret Provider
// Description: Reads the secret bundle from a local JSON file.
// Purpose: Development and test stand-in for Vault.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`FileSecretProvider`] reads a JSON object from disk. The file is read on
//! every fetch; callers fetch once at startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::traits::SecretBundle;
use crate::traits::SecretFetchError;
use crate::traits::SecretProvider;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum secret file size.
const MAX_SECRET_FILE_BYTES: u64 = 256 * 1024;

// ============================================================================
// SECTION: Provider
// ============================================================================

/// Secret provider backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSecretProvider {
    /// Path to the secrets file.
    path: PathBuf,
}

impl FileSecretProvider {
    /// Creates a provider for the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the secrets file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self) -> Result<SecretBundle, SecretFetchError> {
        let path_display = self.path.display().to_string();
        let metadata = std::fs::metadata(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => SecretFetchError::NotFound(path_display.clone()),
            ErrorKind::PermissionDenied => SecretFetchError::PermissionDenied(path_display.clone()),
            _ => SecretFetchError::ReadError(format!("cannot stat {path_display}: {err}")),
        })?;
        if metadata.len() > MAX_SECRET_FILE_BYTES {
            return Err(SecretFetchError::Malformed(format!(
                "secrets file exceeds {MAX_SECRET_FILE_BYTES} bytes"
            )));
        }
        let bytes = std::fs::read(&self.path)
            .map_err(|err| SecretFetchError::ReadError(format!("cannot read {path_display}: {err}")))?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|_| SecretFetchError::Malformed(format!("{path_display} is not valid JSON")))?;
        let bundle = SecretBundle::from_value(value)?;
        info!(provider = "file", path = %path_display, "secrets loaded");
        Ok(bundle)
    }
}
