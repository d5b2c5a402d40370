//! Port definition for cache backends.

use std::path::Path;

use crate::domain::entities::{CachedPayload, Resource, ResourceId};
use crate::domain::errors::CacheResult;

/// Which concrete backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Entries held in process memory.
    Memory,
    /// Entries persisted to a directory.
    Disk,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Disk => write!(f, "disk"),
        }
    }
}

/// A bounded, insertion-ordered store of resources.
///
/// Eviction is FIFO: reading an entry never changes its position, and
/// overwriting an existing id keeps its original slot.
///
/// Implementations do no internal locking. Callers sharing one backend
/// between tasks must serialize access themselves.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Stores a resource, evicting the oldest entry first when full.
    /// A no-op when the capacity is zero.
    async fn store(&mut self, id: ResourceId, resource: Resource) -> CacheResult<()>;

    /// Loads the resource stored under `id`.
    ///
    /// `Ok(None)` means absent; an `Err` means the entry exists but could
    /// not be read back.
    async fn get(&mut self, id: &ResourceId) -> CacheResult<Option<Resource>>;

    /// Returns true if `id` is indexed.
    fn contains(&self, id: &ResourceId) -> bool;

    /// Removes one entry. Returns true if it existed.
    async fn remove(&mut self, id: &ResourceId) -> CacheResult<bool>;

    /// Removes the earliest inserted entry. Returns false if empty.
    async fn remove_oldest(&mut self) -> CacheResult<bool>;

    /// Drops every entry from the index.
    async fn clear(&mut self) -> CacheResult<()>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns true if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Changes the capacity, evicting oldest entries until it fits.
    async fn set_capacity(&mut self, capacity: usize) -> CacheResult<()>;

    /// Indexes persisted entries found in `dir`, oldest modification first.
    /// Entries evicted to stay within capacity leave the index only; their
    /// files are never touched.
    ///
    /// Returns how many scanned entries are still held once the scan ends.
    async fn scan(&mut self, dir: &Path) -> CacheResult<usize>;

    /// Snapshot of all entries, oldest first.
    fn entries(&self) -> Vec<(ResourceId, CachedPayload)>;
}
