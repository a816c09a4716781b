// crates/data-lichen-store-sqlite/src/lib.rs
// ============================================================================
// Module: Data Lichen SQLite Store
// Description: SQLite-backed metadata store.
// Purpose: Expose the durable store and its configuration types.
// Dependencies: data-lichen-core, rusqlite
// ============================================================================

//! ## Overview
//! Durable [`data_lichen_core::MetadataStore`] implementation over a single
//! `SQLite` file. The `metadata` table keeps one row per unique identifier;
//! auxiliary tables track write revisions for outbox publishing.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqliteMetadataStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
