// crates/data-lichen-broker/tests/sinks/channel_tests.rs
// ============================================================================
// Module: ChannelBrokerClient Unit Tests
// Description: Tests for the channel-based broker client.
// Purpose: Validate batch delivery and closed-channel handling.
// Dependencies: data-lichen-broker, data-lichen-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`data_lichen_broker::ChannelBrokerClient`] delivery behavior.

use data_lichen_broker::ChannelBrokerClient;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerError;
use data_lichen_core::PublishBatch;

use super::common::sample_envelopes;
use super::common::topic;

/// Tests channel client forwards the batch intact.
#[tokio::test]
async fn channel_client_forwards_batch() {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<PublishBatch>(1);
    let client = ChannelBrokerClient::new(tx);
    let envelopes = sample_envelopes(&["A1", "B2"]);
    client.publish_batch(&topic(), &envelopes).await.unwrap();

    let batch = rx.recv().await.unwrap();
    assert_eq!(batch.topic, topic());
    assert_eq!(batch.envelopes, envelopes);
}

/// Tests channel client fails when the receiver is dropped.
#[tokio::test]
async fn channel_client_fails_when_receiver_closed() {
    let (tx, rx) = tokio::sync::mpsc::channel::<PublishBatch>(1);
    drop(rx);
    let client = ChannelBrokerClient::new(tx);
    let err = client.publish_batch(&topic(), &sample_envelopes(&["A1"])).await.unwrap_err();
    assert!(matches!(err, BrokerError::ChannelClosed));
}
