// crates/data-lichen-core/src/runtime/mod.rs
// ============================================================================
// Module: Data Lichen Runtime
// Description: Registration, query, and publish handlers plus shared handles.
// Purpose: Implement the metadata registry and publish pipeline over interfaces.
// Dependencies: crate::{core, interfaces}, tokio, tracing
// ============================================================================

//! ## Overview
//! The runtime wires the interfaces together. [`MetadataRegistry`] validates
//! registrations and serves snapshots; [`PublishPipeline`] turns a snapshot
//! (or, in outbox mode, the undelivered changes) into one broker batch.
//! Handlers own no record state; the injected store is the only source of
//! truth.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod publish;
pub mod registry;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use publish::PublishError;
pub use publish::PublishMode;
pub use publish::PublishPipeline;
pub use publish::PublishReport;
pub use publish::SharedBrokerClient;
pub use registry::MetadataRegistry;
pub use registry::RegistrationError;
pub use registry::RegistrationReceipt;
pub use store::InMemoryMetadataStore;
pub use store::SharedMetadataStore;
