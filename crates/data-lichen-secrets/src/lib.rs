// crates/data-lichen-secrets/src/lib.rs
// ============================================================================
// Module: Data Lichen Secrets Library
// Description: Secret providers consulted once at process start.
// Purpose: Fetch the secret bundle that configures the auth gate.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! A [`SecretProvider`] returns a [`SecretBundle`]: a flat JSON object of
//! named secrets. [`VaultKvProvider`] reads a `HashiCorp` Vault KV v2 path;
//! [`FileSecretProvider`] reads a local JSON file for development.
//! Invariants:
//! - Secret values never appear in error messages, logs, or `Debug` output.
//! - A fetch failure is reported, never retried; callers treat it as fatal.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod file;
pub mod traits;
pub mod vault;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use file::FileSecretProvider;
pub use traits::SecretBundle;
pub use traits::SecretFetchError;
pub use traits::SecretProvider;
pub use vault::VaultKvConfig;
pub use vault::VaultKvProvider;
