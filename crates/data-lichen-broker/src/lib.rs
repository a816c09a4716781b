// crates/data-lichen-broker/src/lib.rs
// ============================================================================
// Module: Data Lichen Broker Library
// Description: Broker clients for publishing metadata batches.
// Purpose: Deliver envelope batches to a Kafka REST proxy or local sinks.
// Dependencies: data-lichen-core, reqwest, tokio, url
// ============================================================================

//! ## Overview
//! Data Lichen Broker provides ready-made [`data_lichen_core::BrokerClient`]
//! implementations: [`KafkaRestClient`] for a Confluent-compatible REST proxy,
//! [`LogBrokerClient`] for writing batches as JSON lines, and
//! [`ChannelBrokerClient`] for in-process delivery.
//! Invariants:
//! - One `publish_batch` call performs at most one delivery attempt.
//! - Clients succeed only after the whole batch is accepted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod kafka_rest;
pub mod sink;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use kafka_rest::KAFKA_JSON_V2_CONTENT_TYPE;
pub use kafka_rest::KafkaRestClient;
pub use kafka_rest::KafkaRestConfig;
pub use kafka_rest::KafkaRestSetupError;
pub use sink::ChannelBrokerClient;
pub use sink::LogBrokerClient;
