// crates/data-lichen-server/src/auth.rs
// ============================================================================
// Module: Route Auth Gate
// Description: Bearer-token authentication for protected routes.
// Purpose: Gate protected routes on secret-supplied tokens and audit decisions.
// Dependencies: data-lichen-secrets, serde, sha2, subtle
// ============================================================================

//! ## Overview
//! The gate checks the `Authorization: Bearer <token>` header against the
//! tokens loaded from the secret provider at startup. Every decision is
//! emitted to an [`AuthAuditSink`]. Tokens never appear in audit events or
//! errors; accepted tokens are identified by their SHA-256 fingerprint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::IpAddr;

use data_lichen_secrets::SecretBundle;
use data_lichen_secrets::SecretFetchError;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted `Authorization` header size.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// Realm advertised in `WWW-Authenticate` when none is configured.
pub const DEFAULT_REALM: &str = "data-lichen";

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Auth gate settings carried in the startup secret bundle.
///
/// Extra keys in the bundle are ignored so the same secret can hold settings
/// for other consumers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthGateSettings {
    /// Accepted bearer tokens.
    #[serde(default)]
    pub bearer_tokens: Vec<String>,
    /// Realm advertised to unauthenticated callers.
    #[serde(default)]
    pub realm: Option<String>,
}

impl AuthGateSettings {
    /// Reads the settings from a secret bundle.
    ///
    /// # Errors
    ///
    /// Returns [`SecretFetchError::Malformed`] when the bundle does not match
    /// the settings shape.
    pub fn from_bundle(bundle: &SecretBundle) -> Result<Self, SecretFetchError> {
        bundle.deserialize_into()
    }
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request inputs for auth decisions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Route being accessed.
    pub route: String,
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Raw `Authorization` header value.
    pub auth_header: Option<String>,
}

impl RequestContext {
    /// Builds a request context.
    #[must_use]
    pub fn new(route: impl Into<String>, peer_ip: Option<IpAddr>, auth_header: Option<String>) -> Self {
        Self {
            route: route.into(),
            peer_ip,
            auth_header,
        }
    }
}

/// Authenticated caller context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// SHA-256 fingerprint of the accepted token (hex).
    pub token_fingerprint: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication or authorization errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Caller is authenticated but not allowed.
    ///
    /// [`BearerTokenGate`] never returns this; it exists for gates that
    /// authorize per route or per caller, and maps to 403.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Authentication gate for protected routes.
pub trait AuthGate: Send + Sync {
    /// Authorizes a request. Returns the caller context on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the request must be rejected.
    fn authorize(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError>;

    /// Realm advertised in `WWW-Authenticate` challenges.
    fn realm(&self) -> &str {
        DEFAULT_REALM
    }
}

/// Audit sink for auth decisions.
pub trait AuthAuditSink: Send + Sync {
    /// Records an auth audit event.
    fn record(&self, event: &AuthAuditEvent);
}

// ============================================================================
// SECTION: Bearer Gate
// ============================================================================

/// Gate accepting any of a fixed set of bearer tokens.
///
/// # Invariants
/// - An empty token set rejects every request.
pub struct BearerTokenGate {
    /// Accepted tokens.
    tokens: Vec<String>,
    /// Advertised realm.
    realm: String,
}

impl BearerTokenGate {
    /// Builds a gate from settings. Blank tokens are dropped.
    #[must_use]
    pub fn from_settings(settings: AuthGateSettings) -> Self {
        let tokens =
            settings.bearer_tokens.into_iter().filter(|token| !token.trim().is_empty()).collect();
        Self {
            tokens,
            realm: settings.realm.unwrap_or_else(|| DEFAULT_REALM.to_string()),
        }
    }

    /// Returns the number of accepted tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Compares every configured token in constant time per token.
    fn matches(&self, candidate: &str) -> bool {
        let mut found = subtle::Choice::from(0);
        for token in &self.tokens {
            found |= token.as_bytes().ct_eq(candidate.as_bytes());
        }
        found.into()
    }
}

impl AuthGate for BearerTokenGate {
    fn authorize(&self, ctx: &RequestContext) -> Result<AuthContext, AuthError> {
        let token = parse_bearer_token(ctx.auth_header.as_deref())?;
        if !self.matches(token) {
            return Err(AuthError::Unauthenticated("invalid bearer token".to_string()));
        }
        Ok(AuthContext {
            token_fingerprint: token_fingerprint(token),
        })
    }

    fn realm(&self) -> &str {
        &self.realm
    }
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Auth audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AuthAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Decision outcome.
    decision: &'static str,
    /// Route being accessed.
    route: String,
    /// Caller IP address (if available).
    peer_ip: Option<String>,
    /// Accepted token fingerprint (sha256).
    token_fingerprint: Option<String>,
    /// Failure reason (for deny events).
    reason: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an allow event.
    #[must_use]
    pub fn allowed(ctx: &RequestContext, auth: &AuthContext) -> Self {
        Self {
            event: "route_authz",
            decision: "allow",
            route: ctx.route.clone(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            token_fingerprint: Some(auth.token_fingerprint.clone()),
            reason: None,
        }
    }

    /// Builds a deny event.
    #[must_use]
    pub fn denied(ctx: &RequestContext, error: &AuthError) -> Self {
        Self {
            event: "route_authz",
            decision: "deny",
            route: ctx.route.clone(),
            peer_ip: ctx.peer_ip.map(|ip| ip.to_string()),
            token_fingerprint: None,
            reason: Some(error.to_string()),
        }
    }

    /// Returns the decision label.
    #[must_use]
    pub const fn decision(&self) -> &'static str {
        self.decision
    }

    /// Returns the route label.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }
}

/// Audit sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl AuthAuditSink for StderrAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr();
            let _ = writeln!(&mut stderr, "{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuthAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the hex SHA-256 fingerprint of a token.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extracts the token from a `Bearer` authorization header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::use_debug, reason = "Test-only assertions.")]

    use data_lichen_secrets::SecretBundle;
    use serde_json::json;

    use super::AuthError;
    use super::AuthGate;
    use super::AuthGateSettings;
    use super::BearerTokenGate;
    use super::RequestContext;
    use super::parse_bearer_token;
    use super::token_fingerprint;

    fn gate(tokens: &[&str]) -> BearerTokenGate {
        BearerTokenGate::from_settings(AuthGateSettings {
            bearer_tokens: tokens.iter().map(ToString::to_string).collect(),
            realm: None,
        })
    }

    fn ctx(header: Option<&str>) -> RequestContext {
        RequestContext::new("/some-protected-route", None, header.map(str::to_string))
    }

    #[test]
    fn accepts_configured_token_case_insensitive_scheme() {
        let gate = gate(&["alpha", "beta"]);
        let auth = gate.authorize(&ctx(Some("bearer beta"))).unwrap();
        assert_eq!(auth.token_fingerprint, token_fingerprint("beta"));
        assert_eq!(auth.token_fingerprint.len(), 64);
    }

    #[test]
    fn rejects_unknown_token_and_missing_header() {
        let gate = gate(&["alpha"]);
        assert!(matches!(
            gate.authorize(&ctx(Some("Bearer alpha2"))),
            Err(AuthError::Unauthenticated(_))
        ));
        assert!(matches!(gate.authorize(&ctx(None)), Err(AuthError::Unauthenticated(_))));
    }

    #[test]
    fn empty_token_set_rejects_everything() {
        let gate = gate(&["", "  "]);
        assert_eq!(gate.token_count(), 0);
        assert!(gate.authorize(&ctx(Some("Bearer "))).is_err());
        assert!(gate.authorize(&ctx(Some("Bearer x"))).is_err());
    }

    #[test]
    fn parse_rejects_other_schemes() {
        assert!(parse_bearer_token(Some("Basic dXNlcjpwYXNz")).is_err());
        assert!(parse_bearer_token(Some("Bearer")).is_err());
        assert_eq!(parse_bearer_token(Some("  Bearer   tok  ")).unwrap(), "tok");
    }

    #[test]
    fn settings_ignore_unrelated_secret_keys() {
        let bundle = SecretBundle::from_value(json!({
            "realm": "master",
            "resource": "data-lichen-client",
            "bearer_tokens": ["t1"]
        }))
        .unwrap();
        let settings = AuthGateSettings::from_bundle(&bundle).unwrap();
        assert_eq!(settings.bearer_tokens, vec!["t1".to_string()]);
        let gate = BearerTokenGate::from_settings(settings);
        assert_eq!(gate.realm(), "master");
    }
}
