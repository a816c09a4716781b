// crates/data-lichen-broker/tests/sinks/log_tests.rs
// ============================================================================
// Module: LogBrokerClient Unit Tests
// Description: Tests for the JSON-lines log broker client.
// Purpose: Validate line format and write failure handling.
// Dependencies: data-lichen-broker, data-lichen-core
// ============================================================================

//! ## Overview
//! Exercises [`data_lichen_broker::LogBrokerClient`] output behavior.

use data_lichen_broker::LogBrokerClient;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerError;
use serde_json::Value;

use super::common::FailingWriter;
use super::common::SharedBuffer;
use super::common::sample_envelopes;
use super::common::topic;

/// Tests log client writes one json line per batch.
#[tokio::test]
async fn log_client_writes_one_line_per_batch() {
    let buffer = SharedBuffer::new();
    let client = LogBrokerClient::new(buffer.clone());
    client.publish_batch(&topic(), &sample_envelopes(&["A1", "B2"])).await.unwrap();
    client.publish_batch(&topic(), &sample_envelopes(&["C3"])).await.unwrap();

    let output = buffer.to_string_lossy();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["topic"], "data-discovery");
    assert_eq!(first["records"].as_array().unwrap().len(), 2);
    assert_eq!(first["records"][0]["value"]["uniqueIdentifier"], "A1");
}

/// Tests log client reports write failures.
#[tokio::test]
async fn log_client_reports_write_failure() {
    let client = LogBrokerClient::new(FailingWriter);
    let err = client.publish_batch(&topic(), &sample_envelopes(&["A1"])).await.unwrap_err();
    assert!(matches!(err, BrokerError::Unreachable(message) if message.contains("simulated")));
}
