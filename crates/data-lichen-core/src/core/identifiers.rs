// crates/data-lichen-core/src/core/identifiers.rs
// ============================================================================
// Module: Data Lichen Identifiers
// Description: Record identifiers, broker topic names, and store revisions.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings that serialize transparently. Construction
//! through `parse` enforces the boundary rules (non-empty, bounded length);
//! deserialization goes through the same checks so a stored or inbound value
//! can never bypass them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a unique identifier in bytes.
pub const MAX_IDENTIFIER_BYTES: usize = 1024;
/// Maximum length of a broker topic name (Kafka limit).
pub const MAX_TOPIC_NAME_LENGTH: usize = 249;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier was empty or whitespace only.
    #[error("{0} must be non-empty")]
    Empty(&'static str),
    /// Identifier exceeded its length limit.
    #[error("{kind} exceeds {max} bytes")]
    TooLong {
        /// Identifier kind label.
        kind: &'static str,
        /// Maximum permitted length.
        max: usize,
    },
    /// Identifier contained a disallowed character.
    #[error("{kind} contains invalid character '{ch}'")]
    InvalidCharacter {
        /// Identifier kind label.
        kind: &'static str,
        /// Offending character.
        ch: char,
    },
}

// ============================================================================
// SECTION: Unique Identifier
// ============================================================================

/// Caller-supplied primary key of a metadata record.
///
/// # Invariants
/// - Never empty or whitespace only.
/// - At most [`MAX_IDENTIFIER_BYTES`] bytes.
/// - Stored verbatim (no trimming or case folding).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UniqueIdentifier(String);

impl UniqueIdentifier {
    /// Parses a unique identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value is empty or too long.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentifierError::Empty("uniqueIdentifier"));
        }
        if value.len() > MAX_IDENTIFIER_BYTES {
            return Err(IdentifierError::TooLong {
                kind: "uniqueIdentifier",
                max: MAX_IDENTIFIER_BYTES,
            });
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for UniqueIdentifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UniqueIdentifier> for String {
    fn from(value: UniqueIdentifier) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Topic Name
// ============================================================================

/// Broker topic the publish pipeline targets.
///
/// # Invariants
/// - 1 to [`MAX_TOPIC_NAME_LENGTH`] characters from `[A-Za-z0-9._-]`.
/// - Safe to embed in a URL path segment without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicName(String);

impl TopicName {
    /// Parses a topic name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the name is empty, too long, or has
    /// characters outside the allowed set.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdentifierError::Empty("topic"));
        }
        if value.len() > MAX_TOPIC_NAME_LENGTH {
            return Err(IdentifierError::TooLong {
                kind: "topic",
                max: MAX_TOPIC_NAME_LENGTH,
            });
        }
        if let Some(ch) =
            value.chars().find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')))
        {
            return Err(IdentifierError::InvalidCharacter {
                kind: "topic",
                ch,
            });
        }
        Ok(Self(value))
    }

    /// Returns the topic name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for TopicName {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TopicName> for String {
    fn from(value: TopicName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Revision
// ============================================================================

/// Store-wide monotonic write counter used by the outbox publish mode.
///
/// # Invariants
/// - `Revision::ZERO` precedes every assigned revision.
/// - Each upsert receives a revision strictly greater than all earlier ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Revision preceding every write.
    pub const ZERO: Self = Self(0);

    /// Creates a revision from its raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the following revision.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
