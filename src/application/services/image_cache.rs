//! Cache façade owning the active backend.

use std::path::Path;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::entities::{CachedPayload, Resource, ResourceId, StoreStrategy};
use crate::domain::errors::CacheResult;
use crate::domain::ports::{BackendKind, CacheBackend};

/// Owns the active [`CacheBackend`] and the store strategy.
///
/// Backend access is serialized through one async mutex. Construct one per
/// cache you need and share it behind an `Arc`.
pub struct ImageCache {
    backend: Mutex<Box<dyn CacheBackend>>,
    strategy: RwLock<StoreStrategy>,
}

impl ImageCache {
    /// Creates a cache over `backend`.
    #[must_use]
    pub fn new(backend: Box<dyn CacheBackend>, strategy: StoreStrategy) -> Self {
        Self {
            backend: Mutex::new(backend),
            strategy: RwLock::new(strategy),
        }
    }

    /// Creates a cache over `backend` saving original payloads.
    #[must_use]
    pub fn with_backend(backend: impl CacheBackend + 'static) -> Self {
        Self::new(Box::new(backend), StoreStrategy::default())
    }

    /// The strategy used when a request does not override it.
    #[must_use]
    pub fn store_strategy(&self) -> StoreStrategy {
        *self.strategy.read()
    }

    /// Changes the default store strategy.
    pub fn set_store_strategy(&self, strategy: StoreStrategy) {
        *self.strategy.write() = strategy;
    }

    /// Kind of the active backend.
    pub async fn backend_kind(&self) -> BackendKind {
        self.backend.lock().await.kind()
    }

    /// Reads the decoded payload stored under `id`.
    ///
    /// # Errors
    /// Returns error if a persisted entry exists but cannot be read.
    pub async fn lookup(&self, id: &ResourceId) -> CacheResult<Option<Resource>> {
        self.backend.lock().await.get(id).await
    }

    /// Stores `resource` under `id`.
    ///
    /// # Errors
    /// Returns error if the backend cannot persist the entry.
    pub async fn store(&self, id: ResourceId, resource: Resource) -> CacheResult<()> {
        self.backend.lock().await.store(id, resource).await
    }

    /// Returns true if `id` is currently cached.
    pub async fn contains(&self, id: &ResourceId) -> bool {
        self.backend.lock().await.contains(id)
    }

    /// Removes the entry under `id`.
    ///
    /// # Errors
    /// Returns error if a backing file cannot be deleted.
    pub async fn remove(&self, id: &ResourceId) -> CacheResult<bool> {
        self.backend.lock().await.remove(id).await
    }

    /// Removes the earliest inserted entry.
    ///
    /// # Errors
    /// Returns error if a backing file cannot be deleted.
    pub async fn remove_oldest(&self) -> CacheResult<bool> {
        self.backend.lock().await.remove_oldest().await
    }

    /// Removes every entry from the index.
    ///
    /// # Errors
    /// Returns error if the backend fails to clear.
    pub async fn clear(&self) -> CacheResult<()> {
        self.backend.lock().await.clear().await
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.backend.lock().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.backend.lock().await.is_empty()
    }

    /// Maximum number of entries.
    pub async fn capacity(&self) -> usize {
        self.backend.lock().await.capacity()
    }

    /// Changes the capacity, evicting oldest entries as needed.
    ///
    /// # Errors
    /// Returns error if an evicted backing file cannot be deleted.
    pub async fn set_capacity(&self, capacity: usize) -> CacheResult<()> {
        self.backend.lock().await.set_capacity(capacity).await
    }

    /// Rebuilds the backend index from persisted files in `dir`.
    ///
    /// # Errors
    /// Returns error if the directory cannot be read.
    pub async fn scan(&self, dir: &Path) -> CacheResult<usize> {
        self.backend.lock().await.scan(dir).await
    }

    /// Snapshot of every entry, oldest first.
    pub async fn entries(&self) -> Vec<(ResourceId, CachedPayload)> {
        self.backend.lock().await.entries()
    }

    /// Installs `backend` and hands back the previous one.
    ///
    /// The previous backend is not cleared; the caller decides what happens
    /// to it.
    pub async fn replace_backend(&self, backend: Box<dyn CacheBackend>) -> Box<dyn CacheBackend> {
        let mut guard = self.backend.lock().await;
        let previous = std::mem::replace(&mut *guard, backend);
        info!(from = %previous.kind(), to = %guard.kind(), "Replaced cache backend");
        debug!(previous_len = previous.len(), "Previous backend handed back");
        previous
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("strategy", &*self.strategy.read())
            .finish_non_exhaustive()
    }
}
