// crates/data-lichen-broker/src/kafka_rest.rs
// ============================================================================
// Module: Kafka REST Proxy Client
// Description: BrokerClient that produces batches through a Kafka REST proxy.
// Purpose: Submit metadata envelopes to a topic with the v2 JSON embedded format.
// Dependencies: data-lichen-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`KafkaRestClient`] posts `{"records": [{"value": ...}, ...]}` to
//! `{proxy_url}/topics/{topic}` with the `application/vnd.kafka.json.v2+json`
//! content type. The proxy answers with one offset entry per record; any entry
//! carrying an error fails the whole call.
//! Invariants:
//! - Redirects are rejected.
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].
//! - Error details are truncated and never echo the submitted records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use data_lichen_core::BrokerClient;
use data_lichen_core::BrokerEnvelope;
use data_lichen_core::BrokerError;
use data_lichen_core::TopicName;
use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::warn;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type for JSON-embedded produce requests.
pub const KAFKA_JSON_V2_CONTENT_TYPE: &str = "application/vnd.kafka.json.v2+json";
/// Accept header for v2 proxy responses.
const KAFKA_V2_ACCEPT: &str = "application/vnd.kafka.v2+json, application/json";
/// Maximum response body size read from the proxy.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Maximum error detail length carried in [`BrokerError::Rejected`].
const MAX_ERROR_DETAIL_BYTES: usize = 512;
/// Default request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Config
// ============================================================================

/// Kafka REST proxy client configuration.
#[derive(Debug, Clone)]
pub struct KafkaRestConfig {
    /// Proxy base URL, for example `http://localhost/kafka-rest-proxy`.
    pub proxy_url: Url,
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl KafkaRestConfig {
    /// Returns a configuration with default timeouts.
    #[must_use]
    pub const fn new(proxy_url: Url) -> Self {
        Self {
            proxy_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Errors raised while constructing a [`KafkaRestClient`].
#[derive(Debug, Error)]
pub enum KafkaRestSetupError {
    /// Proxy URL is unusable.
    #[error("invalid kafka rest proxy url: {0}")]
    InvalidUrl(String),
    /// HTTP client could not be constructed.
    #[error("kafka rest http client build failed: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Produce request body.
#[derive(Serialize)]
struct ProduceRequest<'a> {
    /// Envelopes, each serialized as `{"value": record}`.
    records: &'a [BrokerEnvelope],
}

/// Produce response body.
#[derive(Deserialize)]
struct ProduceResponse {
    /// One entry per submitted record.
    #[serde(default)]
    offsets: Vec<ProduceOffset>,
}

/// Per-record produce outcome.
#[derive(Deserialize)]
struct ProduceOffset {
    /// Kafka error code, null on success.
    #[serde(default)]
    error_code: Option<i64>,
    /// Error message, null on success.
    #[serde(default)]
    error: Option<String>,
}

impl ProduceOffset {
    /// Returns true when the proxy reported a failure for this record.
    const fn failed(&self) -> bool {
        self.error_code.is_some() || self.error.is_some()
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Broker client backed by a Kafka REST proxy.
///
/// # Invariants
/// - `base_url` has no trailing slash.
/// - The HTTP client is built once and reused for every publish.
#[derive(Debug, Clone)]
pub struct KafkaRestClient {
    /// Reqwest client instance.
    client: Client,
    /// Proxy base URL without a trailing slash.
    base_url: String,
    /// Request timeout in milliseconds, reported on timeouts.
    timeout_ms: u64,
}

impl KafkaRestClient {
    /// Builds a client for the configured proxy.
    ///
    /// # Errors
    ///
    /// Returns [`KafkaRestSetupError`] when the URL scheme is not HTTP(S) or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &KafkaRestConfig) -> Result<Self, KafkaRestSetupError> {
        match config.proxy_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(KafkaRestSetupError::InvalidUrl(format!(
                    "unsupported scheme: {scheme}"
                )));
            }
        }
        if config.proxy_url.host_str().is_none() {
            return Err(KafkaRestSetupError::InvalidUrl("missing host".to_string()));
        }
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| KafkaRestSetupError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.proxy_url.as_str().trim_end_matches('/').to_string(),
            timeout_ms: u64::try_from(config.request_timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Returns the produce URL for a topic.
    #[must_use]
    pub fn topic_url(&self, topic: &TopicName) -> String {
        format!("{}/topics/{}", self.base_url, topic.as_str())
    }
}

#[async_trait]
impl BrokerClient for KafkaRestClient {
    async fn publish_batch(
        &self,
        topic: &TopicName,
        envelopes: &[BrokerEnvelope],
    ) -> Result<(), BrokerError> {
        let body = serde_json::to_vec(&ProduceRequest {
            records: envelopes,
        })
        .map_err(|err| BrokerError::Serialization(err.to_string()))?;
        let url = self.topic_url(topic);
        debug!(url = %url, records = envelopes.len(), "posting batch to kafka rest proxy");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, KAFKA_JSON_V2_CONTENT_TYPE)
            .header(ACCEPT, KAFKA_V2_ACCEPT)
            .body(body)
            .send()
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        let status = response.status();
        let bytes = read_response_body_with_limit(response, MAX_RESPONSE_BYTES)
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        if !status.is_success() {
            return Err(BrokerError::Rejected {
                status: status.as_u16(),
                message: error_detail(&bytes),
            });
        }
        let Ok(parsed) = serde_json::from_slice::<ProduceResponse>(&bytes) else {
            warn!(status = status.as_u16(), "kafka rest proxy returned an unrecognized body");
            return Ok(());
        };
        let failed = parsed.offsets.iter().filter(|offset| offset.failed()).count();
        if failed > 0 {
            return Err(BrokerError::PartialFailure {
                failed,
                total: envelopes.len(),
            });
        }
        Ok(())
    }
}

impl KafkaRestClient {
    /// Maps a reqwest transport error into a broker error.
    fn map_transport_error(&self, err: &reqwest::Error) -> BrokerError {
        if err.is_timeout() {
            BrokerError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            BrokerError::Unreachable(err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = limit.saturating_sub(body.len());
        if remaining == 0 {
            break;
        }
        let take = chunk.len().min(remaining);
        body.extend_from_slice(chunk.get(.. take).unwrap_or_default());
    }
    Ok(body)
}

/// Renders a response body as a bounded, single-line error detail.
fn error_detail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.len() <= MAX_ERROR_DETAIL_BYTES {
        return trimmed.to_string();
    }
    let mut end = MAX_ERROR_DETAIL_BYTES;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    let head = trimmed.get(.. end).unwrap_or_default();
    format!("{head}...")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
