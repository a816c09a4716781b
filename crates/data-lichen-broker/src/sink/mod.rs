// crates/data-lichen-broker/src/sink/mod.rs
// ============================================================================
// Module: Data Lichen Local Sinks
// Description: Broker clients that deliver batches without a remote broker.
// Purpose: Support local runs, demos, and in-process consumers.
// Dependencies: data-lichen-core
// ============================================================================

//! ## Overview
//! Local sinks implement [`data_lichen_core::BrokerClient`] for environments
//! without a Kafka REST proxy. They fail closed: a write or send failure fails
//! the whole batch.

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod channel;
pub mod log;

pub use channel::ChannelBrokerClient;
pub use log::LogBrokerClient;
