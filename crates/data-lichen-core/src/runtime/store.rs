// crates/data-lichen-core/src/runtime/store.rs
// ============================================================================
// Module: Data Lichen In-Memory Store
// Description: In-memory metadata store and the shared store handle.
// Purpose: Provide a deterministic store without external deps plus DI wrapper.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryMetadataStore`] implements [`MetadataStore`] over a mutex-guarded
//! map for tests and local demos. It is not intended for production use.
//! [`SharedMetadataStore`] is the clonable handle constructed once at startup
//! and injected into every handler.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;

use crate::core::MetadataRecord;
use crate::core::Revision;
use crate::core::UniqueIdentifier;
use crate::interfaces::ChangeSet;
use crate::interfaces::MetadataStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable state behind the in-memory store lock.
#[derive(Debug, Default)]
struct InMemoryState {
    /// Records keyed by identifier with the revision of their last write.
    records: BTreeMap<UniqueIdentifier, (Revision, MetadataRecord)>,
    /// Last assigned revision.
    revision: Revision,
    /// Highest delivered revision.
    watermark: Revision,
}

/// In-memory metadata store for tests and examples.
///
/// # Invariants
/// - Each identifier maps to exactly one record.
/// - Snapshots are ordered by identifier.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetadataStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryMetadataStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store state.
    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Io("metadata store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn upsert(&self, record: MetadataRecord) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let revision = guard.revision.next();
        guard.revision = revision;
        guard.records.insert(record.unique_identifier.clone(), (revision, record));
        drop(guard);
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<MetadataRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.records.values().map(|(_, record)| record.clone()).collect())
    }

    async fn changes_since(&self, since: Revision) -> Result<ChangeSet, StoreError> {
        let guard = self.lock()?;
        let mut changed: Vec<(Revision, MetadataRecord)> = guard
            .records
            .values()
            .filter(|(revision, _)| *revision > since)
            .map(|(revision, record)| (*revision, record.clone()))
            .collect();
        drop(guard);
        changed.sort_by_key(|(revision, _)| *revision);
        let high_watermark = changed.last().map_or(since, |(revision, _)| *revision);
        Ok(ChangeSet {
            records: changed.into_iter().map(|(_, record)| record).collect(),
            high_watermark,
        })
    }

    async fn published_watermark(&self) -> Result<Revision, StoreError> {
        Ok(self.lock()?.watermark)
    }

    async fn advance_watermark(&self, revision: Revision) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if revision > guard.watermark {
            guard.watermark = revision;
        }
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Store
// ============================================================================

/// Shared metadata store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedMetadataStore {
    /// Inner store implementation.
    inner: Arc<dyn MetadataStore>,
}

impl SharedMetadataStore {
    /// Wraps a metadata store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl MetadataStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self {
            inner: store,
        }
    }
}

#[async_trait]
impl MetadataStore for SharedMetadataStore {
    async fn upsert(&self, record: MetadataRecord) -> Result<(), StoreError> {
        self.inner.upsert(record).await
    }

    async fn snapshot(&self) -> Result<Vec<MetadataRecord>, StoreError> {
        self.inner.snapshot().await
    }

    async fn changes_since(&self, since: Revision) -> Result<ChangeSet, StoreError> {
        self.inner.changes_since(since).await
    }

    async fn published_watermark(&self) -> Result<Revision, StoreError> {
        self.inner.published_watermark().await
    }

    async fn advance_watermark(&self, revision: Revision) -> Result<(), StoreError> {
        self.inner.advance_watermark(revision).await
    }

    async fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness().await
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
