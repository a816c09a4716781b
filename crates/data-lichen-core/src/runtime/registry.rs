// crates/data-lichen-core/src/runtime/registry.rs
// ============================================================================
// Module: Data Lichen Metadata Registry
// Description: Registration and query handlers over the metadata store.
// Purpose: Validate inbound records, apply them, and serve snapshots.
// Dependencies: crate::{core, interfaces}, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`MetadataRegistry`] is the registration and query entry point. A
//! registration is validated before the store is touched; a store failure is
//! returned to the caller rather than acknowledged. Queries return the store
//! snapshot unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::core::MetadataPayload;
use crate::core::MetadataRecord;
use crate::core::UniqueIdentifier;
use crate::core::ValidationError;
use crate::interfaces::MetadataStore;
use crate::interfaces::StoreError;
use crate::runtime::store::SharedMetadataStore;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registration failures.
///
/// # Invariants
/// - `Validation` implies the store was not called.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Inbound record failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Store rejected or failed the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Acknowledgment for a durable registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// Identifier of the written record.
    pub unique_identifier: UniqueIdentifier,
}

impl RegistrationReceipt {
    /// Acknowledgment message returned to callers.
    pub const MESSAGE: &'static str = "Metadata registered successfully.";
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registration and query handler bound to one store handle.
#[derive(Clone)]
pub struct MetadataRegistry {
    /// Injected store handle.
    store: SharedMetadataStore,
}

impl MetadataRegistry {
    /// Creates a registry over the provided store.
    #[must_use]
    pub const fn new(store: SharedMetadataStore) -> Self {
        Self {
            store,
        }
    }

    /// Returns the store handle.
    #[must_use]
    pub const fn store(&self) -> &SharedMetadataStore {
        &self.store
    }

    /// Parses, validates, and registers a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the body is invalid or the write fails.
    pub async fn register_json(&self, body: &[u8]) -> Result<RegistrationReceipt, RegistrationError> {
        let payload = MetadataPayload::from_json_slice(body).inspect_err(|err| {
            warn!(error = %err, "rejected metadata registration");
        })?;
        self.register(payload).await
    }

    /// Validates and registers a payload.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when validation or the write fails.
    pub async fn register(
        &self,
        payload: MetadataPayload,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let record = payload.into_record().inspect_err(|err| {
            warn!(error = %err, "rejected metadata registration");
        })?;
        self.register_record(record).await
    }

    /// Registers an already validated record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Store`] when the write fails.
    pub async fn register_record(
        &self,
        record: MetadataRecord,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let unique_identifier = record.unique_identifier.clone();
        match self.store.upsert(record).await {
            Ok(()) => {
                info!(unique_identifier = %unique_identifier, "metadata inserted or updated");
                Ok(RegistrationReceipt {
                    unique_identifier,
                })
            }
            Err(err) => {
                error!(
                    unique_identifier = %unique_identifier,
                    error = %err,
                    "metadata registration failed"
                );
                Err(RegistrationError::Store(err))
            }
        }
    }

    /// Returns the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    pub async fn snapshot(&self) -> Result<Vec<MetadataRecord>, StoreError> {
        let records = self.store.snapshot().await.inspect_err(|err| {
            error!(error = %err, "metadata snapshot failed");
        })?;
        debug!(count = records.len(), "metadata snapshot read");
        Ok(records)
    }

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    pub async fn readiness(&self) -> Result<(), StoreError> {
        self.store.readiness().await
    }
}
