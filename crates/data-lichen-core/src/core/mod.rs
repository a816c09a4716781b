// crates/data-lichen-core/src/core/mod.rs
// ============================================================================
// Module: Data Lichen Core Types
// Description: Canonical metadata record, identifier, and envelope types.
// Purpose: Provide stable, serializable types shared by stores, brokers, and routes.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types define the data-quality [`MetadataRecord`], the inbound
//! [`MetadataPayload`] it is validated from, and the broker-facing
//! [`BrokerEnvelope`]. These types are the source of truth for the HTTP
//! surface and the persisted `metadata` table.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod envelope;
pub mod identifiers;
pub mod record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use envelope::BrokerEnvelope;
pub use envelope::PublishBatch;
pub use envelope::envelopes_for;
pub use identifiers::IdentifierError;
pub use identifiers::MAX_IDENTIFIER_BYTES;
pub use identifiers::MAX_TOPIC_NAME_LENGTH;
pub use identifiers::Revision;
pub use identifiers::TopicName;
pub use identifiers::UniqueIdentifier;
pub use record::FieldValue;
pub use record::MetadataPayload;
pub use record::MetadataRecord;
pub use record::PayloadValue;
pub use record::ValidationError;
