// crates/data-lichen-broker/src/sink/channel.rs
// ============================================================================
// Module: Channel Broker Client
// Description: Delivers batches over a tokio mpsc channel.
// Purpose: Hand published batches to an in-process consumer.
// Dependencies: data-lichen-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelBrokerClient`] sends each batch as a [`PublishBatch`] and waits
//! for channel capacity. A closed receiver fails the publish.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerEnvelope;
use data_lichen_core::BrokerError;
use data_lichen_core::PublishBatch;
use data_lichen_core::TopicName;
use tokio::sync::mpsc;

// ============================================================================
// SECTION: Channel Client
// ============================================================================

/// Broker client that forwards batches to a channel receiver.
#[derive(Debug, Clone)]
pub struct ChannelBrokerClient {
    /// Sending half of the delivery channel.
    sender: mpsc::Sender<PublishBatch>,
}

impl ChannelBrokerClient {
    /// Creates a channel client over the provided sender.
    #[must_use]
    pub const fn new(sender: mpsc::Sender<PublishBatch>) -> Self {
        Self {
            sender,
        }
    }
}

#[async_trait]
impl BrokerClient for ChannelBrokerClient {
    async fn publish_batch(
        &self,
        topic: &TopicName,
        envelopes: &[BrokerEnvelope],
    ) -> Result<(), BrokerError> {
        let batch = PublishBatch {
            topic: topic.clone(),
            envelopes: envelopes.to_vec(),
        };
        self.sender.send(batch).await.map_err(|_| BrokerError::ChannelClosed)
    }
}
