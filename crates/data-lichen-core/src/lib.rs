// crates/data-lichen-core/src/lib.rs
// ============================================================================
// Module: Data Lichen Core Library
// Description: Public API surface for the Data Lichen core.
// Purpose: Expose the record model, interfaces, and runtime handlers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Data Lichen core owns the metadata registry and the publish pipeline. It
//! defines the [`MetadataRecord`] model, the [`MetadataStore`] and
//! [`BrokerClient`] interfaces that backends implement, and the runtime
//! handlers that register records, return snapshots, and forward snapshots to
//! a broker topic as a single batch.
//! Invariants:
//! - A store never holds two records with the same [`UniqueIdentifier`].
//! - Publish submits at most one broker batch per invocation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::BrokerClient;
pub use interfaces::BrokerError;
pub use interfaces::ChangeSet;
pub use interfaces::MetadataStore;
pub use interfaces::StoreError;
pub use runtime::InMemoryMetadataStore;
pub use runtime::MetadataRegistry;
pub use runtime::PublishError;
pub use runtime::PublishMode;
pub use runtime::PublishPipeline;
pub use runtime::PublishReport;
pub use runtime::RegistrationError;
pub use runtime::RegistrationReceipt;
pub use runtime::SharedBrokerClient;
pub use runtime::SharedMetadataStore;
