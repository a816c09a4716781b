// crates/data-lichen-broker/tests/kafka_rest.rs
// ============================================================================
// Module: Kafka REST Client Tests
// Description: Exercises KafkaRestClient against a local proxy stub.
// Purpose: Validate request shape, status handling, and per-record failures.
// Dependencies: data-lichen-broker, data-lichen-core, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Drives [`data_lichen_broker::KafkaRestClient`] against a one-shot
//! `tiny_http` server standing in for the REST proxy.

#![allow(dead_code, reason = "Common module may have unused helpers.")]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::net::TcpListener;
use std::time::Duration;

use common::ProxyStub;
use common::sample_envelopes;
use common::sample_record;
use common::topic;
use data_lichen_broker::KAFKA_JSON_V2_CONTENT_TYPE;
use data_lichen_broker::KafkaRestClient;
use data_lichen_broker::KafkaRestConfig;
use data_lichen_broker::KafkaRestSetupError;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerError;
use serde_json::Value;
use serde_json::json;
use url::Url;

fn client_for(url: &str, timeout: Duration) -> KafkaRestClient {
    let mut config = KafkaRestConfig::new(Url::parse(url).unwrap());
    config.request_timeout = timeout;
    KafkaRestClient::new(&config).unwrap()
}

// ============================================================================
// SECTION: Success Path
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn posts_records_in_v2_json_format() {
    let stub = ProxyStub::start(
        200,
        r#"{"offsets":[{"partition":0,"offset":10,"error_code":null,"error":null},
            {"partition":0,"offset":11,"error_code":null,"error":null}],"key_schema_id":null,"value_schema_id":null}"#,
        Duration::ZERO,
    );
    let client = client_for(&stub.url("/kafka-rest-proxy/"), Duration::from_secs(5));
    client.publish_batch(&topic(), &sample_envelopes(&["A1", "B2"])).await.unwrap();

    let captured = stub.finish();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/kafka-rest-proxy/topics/data-discovery");
    assert_eq!(captured.content_type.as_deref(), Some(KAFKA_JSON_V2_CONTENT_TYPE));
    let body: Value = serde_json::from_str(&captured.body).unwrap();
    let expected = json!({
        "records": [
            {"value": serde_json::to_value(sample_record("A1")).unwrap()},
            {"value": serde_json::to_value(sample_record("B2")).unwrap()}
        ]
    });
    assert_eq!(body, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn unrecognized_success_body_is_accepted() {
    let stub = ProxyStub::start(200, "ok", Duration::ZERO);
    let client = client_for(&stub.url(""), Duration::from_secs(5));
    client.publish_batch(&topic(), &sample_envelopes(&["A1"])).await.unwrap();
    stub.finish();
}

// ============================================================================
// SECTION: Failure Paths
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_is_rejected_with_detail() {
    let stub = ProxyStub::start(
        404,
        r#"{"error_code":40401,"message":"Topic data-discovery not found."}"#,
        Duration::ZERO,
    );
    let client = client_for(&stub.url(""), Duration::from_secs(5));
    let err = client.publish_batch(&topic(), &sample_envelopes(&["A1"])).await.unwrap_err();
    match err {
        BrokerError::Rejected {
            status,
            message,
        } => {
            assert_eq!(status, 404);
            assert!(message.contains("40401"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    stub.finish();
}

#[tokio::test(flavor = "multi_thread")]
async fn per_record_errors_fail_the_batch() {
    let stub = ProxyStub::start(
        200,
        r#"{"offsets":[{"partition":0,"offset":1,"error_code":null,"error":null},
            {"partition":null,"offset":null,"error_code":50002,"error":"Kafka error"}]}"#,
        Duration::ZERO,
    );
    let client = client_for(&stub.url(""), Duration::from_secs(5));
    let err = client.publish_batch(&topic(), &sample_envelopes(&["A1", "B2"])).await.unwrap_err();
    assert!(matches!(
        err,
        BrokerError::PartialFailure {
            failed: 1,
            total: 2
        }
    ));
    stub.finish();
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_proxy_is_reported() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(&format!("http://127.0.0.1:{port}"), Duration::from_secs(5));
    let err = client.publish_batch(&topic(), &sample_envelopes(&["A1"])).await.unwrap_err();
    assert!(matches!(err, BrokerError::Unreachable(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_proxy_times_out() {
    let stub = ProxyStub::start(200, r#"{"offsets":[]}"#, Duration::from_millis(800));
    let client = client_for(&stub.url(""), Duration::from_millis(150));
    let err = client.publish_batch(&topic(), &sample_envelopes(&["A1"])).await.unwrap_err();
    assert!(matches!(
        err,
        BrokerError::Timeout {
            timeout_ms: 150
        }
    ));
    stub.finish();
}

// ============================================================================
// SECTION: Construction
// ============================================================================

#[test]
fn rejects_non_http_scheme() {
    let config = KafkaRestConfig::new(Url::parse("ftp://proxy.local/").unwrap());
    assert!(matches!(KafkaRestClient::new(&config), Err(KafkaRestSetupError::InvalidUrl(_))));
}

#[test]
fn topic_url_trims_trailing_slash() {
    let client = client_for("http://localhost/kafka-rest-proxy/", Duration::from_secs(1));
    assert_eq!(client.topic_url(&topic()), "http://localhost/kafka-rest-proxy/topics/data-discovery");
}
