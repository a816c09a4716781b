// crates/data-lichen-server/src/lib.rs
// ============================================================================
// Module: Data Lichen Server Library
// Description: HTTP surface for the metadata registry and publish pipeline.
// Purpose: Expose register, query, publish, and probe routes over axum.
// Dependencies: axum, data-lichen-core, data-lichen-secrets, tokio
// ============================================================================

//! ## Overview
//! [`DataLichenServer`] wires a validated [`data_lichen_config::DataLichenConfig`]
//! into an axum router. Route handlers hold one injected store handle, one
//! publish pipeline, and one auth gate for the protected probe route.
//! Invariants:
//! - Secrets are fetched once, before the listener is bound.
//! - Every failed request returns `{error, kind}` with a non-2xx status.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::AuthAuditEvent;
pub use auth::AuthAuditSink;
pub use auth::AuthContext;
pub use auth::AuthError;
pub use auth::AuthGate;
pub use auth::AuthGateSettings;
pub use auth::BearerTokenGate;
pub use auth::NoopAuditSink;
pub use auth::RequestContext;
pub use auth::StderrAuditSink;
pub use error::ApiError;
pub use routes::AppState;
pub use routes::build_router;
pub use server::DataLichenServer;
pub use server::ServerError;
pub use server::build_broker;
pub use server::build_pipeline;
pub use server::build_secret_provider;
pub use server::load_auth_gate;
pub use server::open_store;
pub use server::read_vault_token;
