// crates/data-lichen-broker/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for data-lichen-broker tests.
// Purpose: Provide reusable records, writers, and a one-shot HTTP proxy stub.
// Dependencies: data-lichen-core, tiny_http
// ============================================================================

//! ## Overview
//! Provides shared helper functions and test utilities for broker clients.

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

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use data_lichen_core::BrokerEnvelope;
use data_lichen_core::FieldValue;
use data_lichen_core::MetadataRecord;
use data_lichen_core::TopicName;
use data_lichen_core::UniqueIdentifier;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Record Helpers
// ============================================================================

/// Returns the default topic.
pub fn topic() -> TopicName {
    TopicName::parse("data-discovery").expect("topic")
}

/// Creates a populated record.
pub fn sample_record(id: &str) -> MetadataRecord {
    MetadataRecord {
        unique_identifier: UniqueIdentifier::parse(id).expect("identifier"),
        service_name: Some("svc1".to_string()),
        service_address: Some("http://h:1".to_string()),
        completeness: FieldValue::real(0.95),
        validity: Some(FieldValue::from(1)),
        accuracy: FieldValue::real(0.9),
        processing_time: Some("2024-01-01T00:00:00Z".to_string()),
        actual_time: Some("2024-01-01T00:00:05Z".to_string()),
        processing_duration: Some("5s".to_string()),
    }
}

/// Creates envelopes for the given identifiers.
pub fn sample_envelopes(ids: &[&str]) -> Vec<BrokerEnvelope> {
    ids.iter().map(|id| BrokerEnvelope::from(sample_record(id))).collect()
}

// ============================================================================
// SECTION: Proxy Stub
// ============================================================================

/// Request observed by the proxy stub.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub url: String,
    /// Content-Type header value.
    pub content_type: Option<String>,
    /// Raw request body.
    pub body: String,
}

/// One-shot HTTP server answering a single request with a canned response.
pub struct ProxyStub {
    /// Bound address.
    pub addr: SocketAddr,
    /// Captured request, filled once the request arrives.
    pub captured: Arc<Mutex<Option<CapturedRequest>>>,
    /// Server thread handle.
    handle: JoinHandle<()>,
}

impl ProxyStub {
    /// Starts a stub that replies with `status` and `body` after `delay`.
    pub fn start(status: u16, body: &'static str, delay: Duration) -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let addr = server.server_addr().to_ip().expect("ip listener");
        let captured = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&captured);
        let handle = std::thread::spawn(move || {
            if let Ok(mut request) = server.recv() {
                let mut body_text = String::new();
                request.as_reader().read_to_string(&mut body_text).expect("read body");
                let content_type = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Content-Type"))
                    .map(|header| header.value.as_str().to_string());
                *slot.lock().unwrap() = Some(CapturedRequest {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    content_type,
                    body: body_text,
                });
                std::thread::sleep(delay);
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/vnd.kafka.v2+json")
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });
        Self {
            addr,
            captured,
            handle,
        }
    }

    /// Returns the proxy base URL with the given path prefix.
    pub fn url(&self, prefix: &str) -> String {
        format!("http://{}{prefix}", self.addr)
    }

    /// Waits for the server thread and returns the captured request.
    pub fn finish(self) -> CapturedRequest {
        self.handle.join().expect("server thread");
        self.captured.lock().unwrap().clone().expect("request captured")
    }
}

// ============================================================================
// SECTION: Shared Buffer for Write Testing
// ============================================================================

/// A thread-safe buffer for testing Write implementations.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates a new empty shared buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents as a string.
    pub fn to_string_lossy(&self) -> String {
        let guard = self.inner.lock().expect("buffer lock");
        String::from_utf8_lossy(&guard).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Failing Writer for Error Testing
// ============================================================================

/// A writer that always fails, for testing error paths.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("simulated write failure"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
