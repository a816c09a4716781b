// crates/data-lichen-server/src/routes.rs
// ============================================================================
// Module: HTTP Routes
// Description: Axum router and handlers for the Data Lichen API.
// Purpose: Bind HTTP requests to the registry, publish pipeline, and auth gate.
// Dependencies: axum, data-lichen-core, serde
// ============================================================================

//! ## Overview
//! Handlers are thin: they extract the request, call the registry or the
//! publish pipeline, and map the outcome to JSON. Every failure goes through
//! [`ApiError`] so callers always receive `{error, kind}`, including body
//! extraction rejections such as an oversized request.
//! Security posture: request bodies are untrusted and size-limited; only the
//! protected probe route consults the auth gate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use data_lichen_core::MetadataRecord;
use data_lichen_core::MetadataRegistry;
use data_lichen_core::PublishPipeline;
use data_lichen_core::PublishReport;
use data_lichen_core::RegistrationReceipt;
use serde::Serialize;

use crate::auth::AuthAuditEvent;
use crate::auth::AuthAuditSink;
use crate::auth::AuthGate;
use crate::auth::RequestContext;
use crate::error::ApiError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Greeting returned by the root route.
pub const WELCOME_MESSAGE: &str = "Welcome to Datalichen";
/// Path of the auth-gated probe route.
pub const PROTECTED_ROUTE: &str = "/some-protected-route";
/// Body returned by the protected probe on success.
pub const PROTECTED_MESSAGE: &str = "This is protected!";

// ============================================================================
// SECTION: State
// ============================================================================

/// Handles shared by all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registration and query handler.
    registry: MetadataRegistry,
    /// Publish pipeline.
    pipeline: PublishPipeline,
    /// Auth gate for protected routes.
    gate: Arc<dyn AuthGate>,
    /// Audit sink for auth decisions.
    audit: Arc<dyn AuthAuditSink>,
}

impl AppState {
    /// Builds route state from injected handles.
    #[must_use]
    pub fn new(
        registry: MetadataRegistry,
        pipeline: PublishPipeline,
        gate: Arc<dyn AuthGate>,
        audit: Arc<dyn AuthAuditSink>,
    ) -> Self {
        Self {
            registry,
            pipeline,
            gate,
            audit,
        }
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// Returns the publish pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &PublishPipeline {
        &self.pipeline
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the API router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()`; the
/// protected route reads the peer address for auditing.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handle_welcome))
        .route("/register", post(handle_register))
        .route("/metadata", get(handle_metadata))
        .route("/publish-metadata", get(handle_publish))
        .route(PROTECTED_ROUTE, get(handle_protected))
        .route("/readyz", get(handle_readyz))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(Arc::new(state))
}

// ============================================================================
// SECTION: Response Bodies
// ============================================================================

/// Acknowledgment body.
#[derive(Debug, Serialize)]
struct MessageBody {
    /// Acknowledgment text.
    message: &'static str,
}

/// Publish acknowledgment body.
#[derive(Debug, Serialize)]
struct PublishBody {
    /// Acknowledgment text.
    message: &'static str,
    /// Publish outcome.
    #[serde(flatten)]
    report: PublishReport,
}

/// Readiness body.
#[derive(Debug, Serialize)]
struct ReadyBody {
    /// `ready` or `unavailable`.
    status: &'static str,
    /// Failure detail when unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /`.
async fn handle_welcome() -> Json<&'static str> {
    Json(WELCOME_MESSAGE)
}

/// `POST /register`.
async fn handle_register(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let body = body?;
    state.registry.register_json(&body).await?;
    Ok(Json(MessageBody {
        message: RegistrationReceipt::MESSAGE,
    }))
}

/// `GET /metadata`.
async fn handle_metadata(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MetadataRecord>>, ApiError> {
    let records = state.registry.snapshot().await?;
    Ok(Json(records))
}

/// `GET /publish-metadata`.
async fn handle_publish(State(state): State<Arc<AppState>>) -> Result<Json<PublishBody>, ApiError> {
    let report = state.pipeline.publish().await?;
    Ok(Json(PublishBody {
        message: PublishReport::MESSAGE,
        report,
    }))
}

/// `GET /some-protected-route`.
async fn handle_protected(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<&'static str, ApiError> {
    let auth_header =
        headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string);
    let ctx = RequestContext::new(PROTECTED_ROUTE, Some(peer.ip()), auth_header);
    match state.gate.authorize(&ctx) {
        Ok(auth) => {
            state.audit.record(&AuthAuditEvent::allowed(&ctx, &auth));
            Ok(PROTECTED_MESSAGE)
        }
        Err(error) => {
            state.audit.record(&AuthAuditEvent::denied(&ctx, &error));
            Err(ApiError::Auth {
                error,
                realm: state.gate.realm().to_string(),
            })
        }
    }
}

/// `GET /readyz`.
async fn handle_readyz(State(state): State<Arc<AppState>>) -> Response {
    match state.registry.readiness().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyBody {
                status: "ready",
                error: None,
            }),
        )
            .into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "unavailable",
                error: Some(err.to_string()),
            }),
        )
            .into_response(),
    }
}
