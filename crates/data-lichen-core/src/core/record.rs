// crates/data-lichen-core/src/core/record.rs
// ============================================================================
// Module: Data Lichen Metadata Records
// Description: Data-quality metadata records and inbound payload validation.
// Purpose: Define the persisted record shape and the registration boundary.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`MetadataRecord`] is one data-quality observation reported by a service.
//! Inbound requests arrive as a [`MetadataPayload`], which is deliberately
//! loose: every field is optional, unknown keys are ignored, and any JSON
//! scalar is accepted for a pass-through field. Conversion to a record enforces
//! the single hard rule (a present, non-empty `uniqueIdentifier`) and keeps the
//! remaining fields as sent. Scores are not range checked or coerced: a
//! `validity` of `97.5` is stored and emitted as `97.5`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use thiserror::Error;

use crate::core::identifiers::IdentifierError;
use crate::core::identifiers::UniqueIdentifier;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration input validation errors.
///
/// # Invariants
/// - Raised before any store access.
/// - Messages name the offending field but never echo full payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Payload was not a JSON object of scalar fields.
    #[error("malformed metadata payload: {0}")]
    Malformed(String),
    /// `uniqueIdentifier` was absent or null.
    #[error("uniqueIdentifier is required")]
    MissingIdentifier,
    /// `uniqueIdentifier` was present but unusable.
    #[error("invalid uniqueIdentifier: {0}")]
    InvalidIdentifier(IdentifierError),
}

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// Score field value kept exactly as reported.
///
/// # Invariants
/// - Numbers keep their integer or float form through serialization.
/// - Text is only produced when the reporter sent a non-numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON number.
    Number(Number),
    /// Non-numeric value (for example `"high"`).
    Text(String),
}

impl FieldValue {
    /// Builds a numeric value from a float; `None` for NaN or infinities.
    #[must_use]
    pub fn real(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    /// Returns the number when the value is numeric.
    #[must_use]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(number) => Some(number),
            Self::Text(_) => None,
        }
    }

    /// Returns the text when the value is non-numeric.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<Number> for FieldValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

/// Any JSON scalar accepted for a pass-through payload field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    /// JSON boolean; stored as `1` or `0`, the way `SQLite` binds booleans.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    Text(String),
}

impl PayloadValue {
    /// Converts the value for a text field.
    fn into_text(self) -> String {
        match self {
            Self::Bool(flag) => u8::from(flag).to_string(),
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }

    /// Converts the value for a score field.
    fn into_field(self) -> FieldValue {
        match self {
            Self::Bool(flag) => FieldValue::from(i64::from(flag)),
            Self::Number(number) => FieldValue::Number(number),
            Self::Text(text) => FieldValue::Text(text),
        }
    }
}

// ============================================================================
// SECTION: Metadata Record
// ============================================================================

/// Data-quality observation keyed by a caller-supplied identifier.
///
/// # Invariants
/// - `unique_identifier` is the sole key; a later write with the same key
///   replaces every other field.
/// - Serialization always emits all nine keys; absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    /// Primary key.
    pub unique_identifier: UniqueIdentifier,
    /// Reporting service name.
    pub service_name: Option<String>,
    /// Reporting service address.
    pub service_address: Option<String>,
    /// Completeness score, as reported.
    pub completeness: Option<FieldValue>,
    /// Validity score, as reported.
    pub validity: Option<FieldValue>,
    /// Accuracy score, as reported.
    pub accuracy: Option<FieldValue>,
    /// When the data was processed, as reported.
    pub processing_time: Option<String>,
    /// When the data became valid, as reported.
    pub actual_time: Option<String>,
    /// How long processing took, as reported.
    pub processing_duration: Option<String>,
}

impl MetadataRecord {
    /// Creates a record with only the identifier populated.
    #[must_use]
    pub const fn new(unique_identifier: UniqueIdentifier) -> Self {
        Self {
            unique_identifier,
            service_name: None,
            service_address: None,
            completeness: None,
            validity: None,
            accuracy: None,
            processing_time: None,
            actual_time: None,
            processing_duration: None,
        }
    }
}

// ============================================================================
// SECTION: Inbound Payload
// ============================================================================

/// Registration request body as sent by reporting services.
///
/// # Invariants
/// - Unknown keys are ignored.
/// - Every non-key field accepts any JSON scalar; arrays and objects are
///   malformed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPayload {
    /// Primary key, required.
    pub unique_identifier: Option<String>,
    /// Reporting service name.
    pub service_name: Option<PayloadValue>,
    /// Reporting service address.
    pub service_address: Option<PayloadValue>,
    /// Completeness score.
    pub completeness: Option<PayloadValue>,
    /// Validity score.
    pub validity: Option<PayloadValue>,
    /// Accuracy score.
    pub accuracy: Option<PayloadValue>,
    /// Processing timestamp.
    pub processing_time: Option<PayloadValue>,
    /// Actual timestamp.
    pub actual_time: Option<PayloadValue>,
    /// Processing duration.
    pub processing_duration: Option<PayloadValue>,
}

impl MetadataPayload {
    /// Parses a payload from request body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] when the bytes are not a JSON
    /// object of scalar fields.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|err| ValidationError::Malformed(err.to_string()))?;
        if !value.is_object() {
            return Err(ValidationError::Malformed("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|err| ValidationError::Malformed(err.to_string()))
    }

    /// Validates the payload and converts it into a record.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the identifier is missing or invalid.
    pub fn into_record(self) -> Result<MetadataRecord, ValidationError> {
        let raw_id = self.unique_identifier.ok_or(ValidationError::MissingIdentifier)?;
        let unique_identifier =
            UniqueIdentifier::parse(raw_id).map_err(ValidationError::InvalidIdentifier)?;
        Ok(MetadataRecord {
            unique_identifier,
            service_name: self.service_name.map(PayloadValue::into_text),
            service_address: self.service_address.map(PayloadValue::into_text),
            completeness: self.completeness.map(PayloadValue::into_field),
            validity: self.validity.map(PayloadValue::into_field),
            accuracy: self.accuracy.map(PayloadValue::into_field),
            processing_time: self.processing_time.map(PayloadValue::into_text),
            actual_time: self.actual_time.map(PayloadValue::into_text),
            processing_duration: self.processing_duration.map(PayloadValue::into_text),
        })
    }
}

impl TryFrom<MetadataPayload> for MetadataRecord {
    type Error = ValidationError;

    fn try_from(payload: MetadataPayload) -> Result<Self, Self::Error> {
        payload.into_record()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
