// crates/data-lichen-core/src/core/envelope.rs
// ============================================================================
// Module: Data Lichen Broker Envelopes
// Description: Broker envelope and batch types for published records.
// Purpose: Wrap metadata records verbatim for submission to a broker topic.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`BrokerEnvelope`] carries exactly one [`MetadataRecord`] as its `value`,
//! which is the record shape the Kafka REST proxy expects inside its
//! `records` array. A [`PublishBatch`] is the unit a broker client submits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TopicName;
use crate::core::record::MetadataRecord;

// ============================================================================
// SECTION: Envelope Types
// ============================================================================

/// Broker envelope wrapping one record.
///
/// # Invariants
/// - `value` is the stored record, unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerEnvelope {
    /// Record payload.
    pub value: MetadataRecord,
}

impl From<MetadataRecord> for BrokerEnvelope {
    fn from(value: MetadataRecord) -> Self {
        Self {
            value,
        }
    }
}

/// One batch of envelopes addressed to a topic.
///
/// # Invariants
/// - Submitted as a single broker call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishBatch {
    /// Destination topic.
    pub topic: TopicName,
    /// Envelopes in submission order.
    pub envelopes: Vec<BrokerEnvelope>,
}

/// Maps records into envelopes, preserving order.
#[must_use]
pub fn envelopes_for(records: Vec<MetadataRecord>) -> Vec<BrokerEnvelope> {
    records.into_iter().map(BrokerEnvelope::from).collect()
}
