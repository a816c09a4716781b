// crates/data-lichen-core/src/interfaces/mod.rs
// ============================================================================
// Module: Data Lichen Interfaces
// Description: Backend-agnostic interfaces for metadata storage and broker delivery.
// Purpose: Define the contract surfaces used by the Data Lichen runtime.
// Dependencies: crate::core, async-trait, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Data Lichen integrates with storage backends and
//! message brokers without embedding backend-specific details. Every
//! operation returns an explicit result; implementations must never panic on
//! data errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::core::BrokerEnvelope;
use crate::core::MetadataRecord;
use crate::core::Revision;
use crate::core::TopicName;

// ============================================================================
// SECTION: Metadata Store
// ============================================================================

/// Metadata store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("metadata store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails decoding.
    #[error("metadata store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("metadata store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store input is invalid.
    #[error("metadata store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("metadata store error: {0}")]
    Store(String),
}

/// Records written after a revision, with the highest revision observed.
///
/// # Invariants
/// - Every record in `records` has a revision in `(since, high_watermark]`.
/// - `high_watermark == since` when `records` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    /// Records written after the requested revision, oldest first.
    pub records: Vec<MetadataRecord>,
    /// Highest revision covered by `records`.
    pub high_watermark: Revision,
}

/// Keyed metadata store with full-record upsert semantics.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Inserts the record or fully replaces the row with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on constraint violation or I/O failure; no partial
    /// write is visible to readers on failure.
    async fn upsert(&self, record: MetadataRecord) -> Result<(), StoreError>;

    /// Returns every current record, each identifier at most once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    async fn snapshot(&self) -> Result<Vec<MetadataRecord>, StoreError>;

    /// Returns records written after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    async fn changes_since(&self, since: Revision) -> Result<ChangeSet, StoreError>;

    /// Returns the highest revision already delivered in outbox mode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    async fn published_watermark(&self) -> Result<Revision, StoreError>;

    /// Moves the delivered watermark forward; lower values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    async fn advance_watermark(&self, revision: Revision) -> Result<(), StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    async fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Broker Client
// ============================================================================

/// Broker client errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never include record payloads.
#[derive(Debug, Clone, Error)]
pub enum BrokerError {
    /// Broker could not be reached.
    #[error("broker unreachable: {0}")]
    Unreachable(String),
    /// Broker answered with a non-success status.
    #[error("broker rejected batch with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response detail, truncated.
        message: String,
    },
    /// Broker accepted the call but reported per-record failures.
    #[error("broker reported {failed} of {total} records failed")]
    PartialFailure {
        /// Number of failed records.
        failed: usize,
        /// Number of submitted records.
        total: usize,
    },
    /// Request exceeded its deadline.
    #[error("broker request timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },
    /// Batch could not be serialized or the response decoded.
    #[error("broker serialization failed: {0}")]
    Serialization(String),
    /// Local delivery channel closed.
    #[error("broker channel closed")]
    ChannelClosed,
}

/// Submits envelope batches to a broker topic.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Submits all envelopes to `topic` as one call.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the broker is unreachable, rejects the
    /// batch, or the batch cannot be serialized.
    async fn publish_batch(
        &self,
        topic: &TopicName,
        envelopes: &[BrokerEnvelope],
    ) -> Result<(), BrokerError>;
}
