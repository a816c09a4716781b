// crates/data-lichen-broker/src/sink/log.rs
// ============================================================================
// Module: Log Broker Client
// Description: Writes each published batch as one JSON line.
// Purpose: Stand in for a broker during local runs.
// Dependencies: data-lichen-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`LogBrokerClient`] serializes `{"topic": ..., "records": [...]}` to a
//! writer, one line per batch, and flushes before reporting success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerEnvelope;
use data_lichen_core::BrokerError;
use data_lichen_core::TopicName;
use serde::Serialize;
use tracing::info;

// ============================================================================
// SECTION: Log Client
// ============================================================================

/// Line written per batch.
#[derive(Serialize)]
struct LoggedBatch<'a> {
    /// Destination topic.
    topic: &'a str,
    /// Envelopes in submission order.
    records: &'a [BrokerEnvelope],
}

/// Broker client that writes batches to a [`Write`] sink.
pub struct LogBrokerClient {
    /// Output writer guarded for concurrent publishes.
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogBrokerClient {
    /// Creates a log client over the provided writer.
    #[must_use]
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Creates a log client that writes to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl BrokerClient for LogBrokerClient {
    async fn publish_batch(
        &self,
        topic: &TopicName,
        envelopes: &[BrokerEnvelope],
    ) -> Result<(), BrokerError> {
        let mut line = serde_json::to_vec(&LoggedBatch {
            topic: topic.as_str(),
            records: envelopes,
        })
        .map_err(|err| BrokerError::Serialization(err.to_string()))?;
        line.push(b'\n');
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| BrokerError::Unreachable("log writer mutex poisoned".to_string()))?;
        writer
            .write_all(&line)
            .and_then(|()| writer.flush())
            .map_err(|err| BrokerError::Unreachable(format!("log write failed: {err}")))?;
        drop(writer);
        info!(topic = %topic, records = envelopes.len(), "batch written to log sink");
        Ok(())
    }
}
