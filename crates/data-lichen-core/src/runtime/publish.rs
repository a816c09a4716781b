// crates/data-lichen-core/src/runtime/publish.rs
// ============================================================================
// Module: Data Lichen Publish Pipeline
// Description: Snapshot-to-broker batch publishing.
// Purpose: Forward the current metadata state to a broker topic in one batch.
// Dependencies: crate::{core, interfaces}, serde, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! [`PublishPipeline`] reads records from the store, wraps each in a
//! [`crate::BrokerEnvelope`], and submits the whole list through a single
//! [`BrokerClient::publish_batch`] call.
//! Invariants:
//! - A store read failure aborts before the broker is called.
//! - No retries and no partial submission; exactly one call per publish,
//!   including an empty batch when there is nothing to forward.
//! - The store is never mutated by a full-resync publish.
//! - In outbox mode the watermark advances only after the broker call succeeds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use tracing::info;

use crate::core::BrokerEnvelope;
use crate::core::MetadataRecord;
use crate::core::Revision;
use crate::core::TopicName;
use crate::core::envelopes_for;
use crate::interfaces::BrokerClient;
use crate::interfaces::BrokerError;
use crate::interfaces::MetadataStore;
use crate::interfaces::StoreError;
use crate::runtime::store::SharedMetadataStore;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Selects which records a publish forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// Every publish sends the full current snapshot.
    #[default]
    FullResync,
    /// Every publish sends only records written since the last delivered batch.
    Outbox,
}

impl PublishMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullResync => "full_resync",
            Self::Outbox => "outbox",
        }
    }
}

/// Publish failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Reading records from the store failed; the broker was not called.
    #[error("failed to read metadata for publish: {0}")]
    Snapshot(StoreError),
    /// The broker call failed.
    #[error("failed to publish metadata: {0}")]
    Broker(BrokerError),
    /// The broker call did not complete within the publish deadline.
    #[error("publish timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline in milliseconds.
        timeout_ms: u64,
    },
    /// The batch was delivered but the outbox watermark could not be advanced.
    #[error("published batch but failed to advance watermark: {0}")]
    Watermark(StoreError),
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Destination topic.
    pub topic: TopicName,
    /// Mode the publish ran in.
    pub mode: PublishMode,
    /// Number of envelopes submitted.
    pub published: usize,
    /// Watermark after the publish (outbox mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Revision>,
}

impl PublishReport {
    /// Acknowledgment message returned to callers.
    pub const MESSAGE: &'static str = "Metadata fetched and sent to Kafka successfully";
}

// ============================================================================
// SECTION: Shared Broker
// ============================================================================

/// Shared broker client backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedBrokerClient {
    /// Inner client implementation.
    inner: Arc<dyn BrokerClient>,
}

impl SharedBrokerClient {
    /// Wraps a broker client in a shared, clonable wrapper.
    #[must_use]
    pub fn from_client(client: impl BrokerClient + 'static) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Wraps an existing shared client.
    #[must_use]
    pub const fn new(client: Arc<dyn BrokerClient>) -> Self {
        Self {
            inner: client,
        }
    }
}

#[async_trait]
impl BrokerClient for SharedBrokerClient {
    async fn publish_batch(
        &self,
        topic: &TopicName,
        envelopes: &[BrokerEnvelope],
    ) -> Result<(), BrokerError> {
        self.inner.publish_batch(topic, envelopes).await
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Publishes store contents to a fixed broker topic.
#[derive(Clone)]
pub struct PublishPipeline {
    /// Injected store handle.
    store: SharedMetadataStore,
    /// Broker client reused across invocations.
    broker: SharedBrokerClient,
    /// Fixed destination topic.
    topic: TopicName,
    /// Record selection mode.
    mode: PublishMode,
    /// Optional deadline for the broker call.
    timeout: Option<Duration>,
}

impl PublishPipeline {
    /// Creates a full-resync pipeline without a deadline.
    #[must_use]
    pub const fn new(
        store: SharedMetadataStore,
        broker: SharedBrokerClient,
        topic: TopicName,
    ) -> Self {
        Self {
            store,
            broker,
            topic,
            mode: PublishMode::FullResync,
            timeout: None,
        }
    }

    /// Returns a copy using the given mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns a copy that bounds the broker call by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the destination topic.
    #[must_use]
    pub const fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Runs one publish.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the store read, the broker call, or the
    /// outbox watermark update fails.
    pub async fn publish(&self) -> Result<PublishReport, PublishError> {
        let result = match self.mode {
            PublishMode::FullResync => self.publish_snapshot().await,
            PublishMode::Outbox => self.publish_outbox().await,
        };
        match &result {
            Ok(report) => info!(
                topic = %report.topic,
                mode = report.mode.as_str(),
                published = report.published,
                "metadata published"
            ),
            Err(err) => error!(
                topic = %self.topic,
                mode = self.mode.as_str(),
                error = %err,
                "metadata publish failed"
            ),
        }
        result
    }

    /// Publishes the full current snapshot.
    async fn publish_snapshot(&self) -> Result<PublishReport, PublishError> {
        let records = self.store.snapshot().await.map_err(PublishError::Snapshot)?;
        let published = self.submit(records).await?;
        Ok(PublishReport {
            topic: self.topic.clone(),
            mode: PublishMode::FullResync,
            published,
            watermark: None,
        })
    }

    /// Publishes records written since the delivered watermark.
    async fn publish_outbox(&self) -> Result<PublishReport, PublishError> {
        let since = self.store.published_watermark().await.map_err(PublishError::Snapshot)?;
        let changes = self.store.changes_since(since).await.map_err(PublishError::Snapshot)?;
        let published = self.submit(changes.records).await?;
        if changes.high_watermark > since {
            self.store
                .advance_watermark(changes.high_watermark)
                .await
                .map_err(PublishError::Watermark)?;
        }
        Ok(PublishReport {
            topic: self.topic.clone(),
            mode: PublishMode::Outbox,
            published,
            watermark: Some(changes.high_watermark),
        })
    }

    /// Submits records as one batch and returns the envelope count.
    ///
    /// An empty record list still produces one (empty) broker call.
    async fn submit(&self, records: Vec<MetadataRecord>) -> Result<usize, PublishError> {
        let envelopes = envelopes_for(records);
        let call = self.broker.publish_batch(&self.topic, &envelopes);
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| PublishError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })?
                .map_err(PublishError::Broker)?,
            None => call.await.map_err(PublishError::Broker)?,
        }
        Ok(envelopes.len())
    }
}
