// crates/data-lichen-server/src/error.rs
// ============================================================================
// Module: API Errors
// Description: Mapping from handler failures to HTTP responses.
// Purpose: Give every failed request a status code and a `{error, kind}` body.
// Dependencies: axum, data-lichen-core, serde
// ============================================================================

//! ## Overview
//! [`ApiError`] is the single failure type returned by route handlers.
//! Validation failures map to 400, oversized bodies to 413, auth failures to
//! 401/403, and store or publish failures to 500.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::response::IntoResponse;
use axum::response::Response;
use data_lichen_core::PublishError;
use data_lichen_core::RegistrationError;
use data_lichen_core::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Failure returned by a route handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload failed validation.
    #[error("{0}")]
    Validation(String),
    /// Request body exceeded the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// Metadata store failed.
    #[error("{0}")]
    Store(String),
    /// Publish pipeline failed.
    #[error("{0}")]
    Publish(String),
    /// Caller failed authentication or authorization.
    #[error("{error}")]
    Auth {
        /// Underlying gate decision.
        error: AuthError,
        /// Realm advertised in the challenge.
        realm: String,
    },
}

impl ApiError {
    /// Returns the stable error kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Store(_) => "store_error",
            Self::Publish(_) => "publish_error",
            Self::Auth {
                ..
            } => "auth_error",
        }
    }

    /// Returns the HTTP status for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) | Self::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth {
                error: AuthError::Unauthenticated(_),
                ..
            } => StatusCode::UNAUTHORIZED,
            Self::Auth {
                error: AuthError::Unauthorized(_),
                ..
            } => StatusCode::FORBIDDEN,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Stable error kind.
    pub kind: &'static str,
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::Validation(rejection.body_text())
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::Validation(err) => Self::Validation(err.to_string()),
            RegistrationError::Store(err) => Self::from(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

impl From<PublishError> for ApiError {
    fn from(error: PublishError) -> Self {
        Self::Publish(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let challenge = match &self {
            Self::Auth {
                error: AuthError::Unauthenticated(_),
                realm,
            } => HeaderValue::from_str(&format!("Bearer realm=\"{realm}\"")).ok(),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(value) = challenge {
            response.headers_mut().insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
