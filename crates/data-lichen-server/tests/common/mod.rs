// crates/data-lichen-server/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for data-lichen-server route tests.
// Purpose: Spawn the router on an ephemeral port with injectable collaborators.
// Dependencies: axum, data-lichen-core, data-lichen-server, tokio
// ============================================================================

//! ## Overview
//! [`TestServer`] binds `127.0.0.1:0`, serves the API router with connect
//! info, and exposes the captured broker batches and audit events.

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
    dead_code,
    reason = "Test-only helpers; not every test binary uses every helper."
)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use data_lichen_broker::ChannelBrokerClient;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerEnvelope;
use data_lichen_core::BrokerError;
use data_lichen_core::ChangeSet;
use data_lichen_core::InMemoryMetadataStore;
use data_lichen_core::MetadataRecord;
use data_lichen_core::MetadataRegistry;
use data_lichen_core::MetadataStore;
use data_lichen_core::PublishBatch;
use data_lichen_core::PublishPipeline;
use data_lichen_core::Revision;
use data_lichen_core::SharedBrokerClient;
use data_lichen_core::SharedMetadataStore;
use data_lichen_core::StoreError;
use data_lichen_core::TopicName;
use data_lichen_server::AppState;
use data_lichen_server::AuthAuditEvent;
use data_lichen_server::AuthAuditSink;
use data_lichen_server::AuthGateSettings;
use data_lichen_server::BearerTokenGate;
use data_lichen_server::build_router;
use tokio::sync::mpsc;

/// Token accepted by the test gate.
pub const TEST_TOKEN: &str = "lichen-test-token";

/// Audit sink capturing events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured events.
    pub events: Mutex<Vec<AuthAuditEvent>>,
}

impl AuthAuditSink for RecordingAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Broker that always fails.
pub struct DownBroker;

#[async_trait]
impl BrokerClient for DownBroker {
    async fn publish_batch(
        &self,
        _topic: &TopicName,
        _envelopes: &[BrokerEnvelope],
    ) -> Result<(), BrokerError> {
        Err(BrokerError::Unreachable("connection refused".to_string()))
    }
}

/// Store whose every operation fails.
pub struct UnavailableStore;

#[async_trait]
impl MetadataStore for UnavailableStore {
    async fn upsert(&self, _record: MetadataRecord) -> Result<(), StoreError> {
        Err(StoreError::Io("disk I/O error".to_string()))
    }

    async fn snapshot(&self) -> Result<Vec<MetadataRecord>, StoreError> {
        Err(StoreError::Io("disk I/O error".to_string()))
    }

    async fn changes_since(&self, _since: Revision) -> Result<ChangeSet, StoreError> {
        Err(StoreError::Io("disk I/O error".to_string()))
    }

    async fn published_watermark(&self) -> Result<Revision, StoreError> {
        Err(StoreError::Io("disk I/O error".to_string()))
    }

    async fn advance_watermark(&self, _revision: Revision) -> Result<(), StoreError> {
        Err(StoreError::Io("disk I/O error".to_string()))
    }

    async fn readiness(&self) -> Result<(), StoreError> {
        Err(StoreError::Io("disk I/O error".to_string()))
    }
}

/// Running API server bound to an ephemeral port.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:40000`.
    pub base: String,
    /// Batches delivered to the channel broker.
    pub batches: mpsc::Receiver<PublishBatch>,
    /// Captured auth audit events.
    pub audit: Arc<RecordingAuditSink>,
    /// HTTP client.
    pub client: reqwest::Client,
}

impl TestServer {
    /// Returns a full URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

/// Returns the default test topic.
pub fn topic() -> TopicName {
    TopicName::parse("data-discovery").unwrap()
}

/// Starts a server over an in-memory store and a channel broker.
pub async fn start() -> TestServer {
    start_with(SharedMetadataStore::from_store(InMemoryMetadataStore::new()), None).await
}

/// Starts a server with the given store and an optional broker override.
pub async fn start_with(
    store: SharedMetadataStore,
    broker: Option<SharedBrokerClient>,
) -> TestServer {
    let (sender, batches) = mpsc::channel(8);
    let broker =
        broker.unwrap_or_else(|| SharedBrokerClient::from_client(ChannelBrokerClient::new(sender)));
    let pipeline = PublishPipeline::new(store.clone(), broker, topic());
    let gate = BearerTokenGate::from_settings(AuthGateSettings {
        bearer_tokens: vec![TEST_TOKEN.to_string()],
        realm: Some("lichen-tests".to_string()),
    });
    let audit = Arc::new(RecordingAuditSink::default());
    let state = AppState::new(
        MetadataRegistry::new(store),
        pipeline,
        Arc::new(gate),
        Arc::clone(&audit) as Arc<dyn AuthAuditSink>,
    );
    let app = build_router(state, 64 * 1024);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await;
    });
    TestServer {
        base: format!("http://{addr}"),
        batches,
        audit,
        client: reqwest::Client::new(),
    }
}
