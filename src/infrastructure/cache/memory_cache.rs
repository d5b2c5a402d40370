//! In-memory FIFO resource cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::domain::entities::{CachedPayload, Resource, ResourceId};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{BackendKind, CacheBackend};

use super::bounded_store::BoundedStore;
use super::disk_cache::DiskCache;
use super::{DEFAULT_CAPACITY, persistence};

/// Cache holding resource bytes directly in memory.
pub struct MemoryCache {
    store: BoundedStore<Resource>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            store: BoundedStore::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.store.len(),
        }
    }

    /// Reads an entry without counting it as a hit or miss.
    #[must_use]
    pub fn peek(&self, id: &ResourceId) -> Option<&Resource> {
        self.store.get(id)
    }

    /// Persists every held entry into `dir`, one file per entry named after
    /// its id, oldest first. Returns the number of files written.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created or a file cannot be
    /// written.
    pub async fn export_to(&self, dir: &Path) -> CacheResult<usize> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CacheError::io(format!("Failed to create {}: {e}", dir.display())))?;

        let mut written = 0;
        for (id, resource) in self.snapshot() {
            persistence::write_entry(&dir.join(id.as_str()), &resource).await?;
            written += 1;
        }

        debug!(dir = %dir.display(), count = written, "Exported memory cache");
        Ok(written)
    }

    /// Builds a [`DiskCache`] in `dir` with this cache's capacity and every
    /// entry stored in insertion order.
    ///
    /// # Errors
    /// Returns error if an entry cannot be persisted.
    pub async fn to_disk(&self, dir: PathBuf) -> CacheResult<DiskCache> {
        let mut disk = DiskCache::new(dir, self.store.capacity());
        for (id, resource) in self.snapshot() {
            disk.store(id, resource).await?;
        }
        Ok(disk)
    }

    fn snapshot(&self) -> Vec<(ResourceId, Resource)> {
        self.store
            .iter()
            .map(|(id, resource)| (id.clone(), resource.clone()))
            .collect()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached entries.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} entries, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryCache {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn store(&mut self, id: ResourceId, resource: Resource) -> CacheResult<()> {
        debug!(id = %id, size = resource.len(), "Storing resource in memory cache");
        if let Some((evicted, _)) = self.store.store(id, resource) {
            debug!(id = %evicted, "Evicted from memory cache");
        }
        Ok(())
    }

    async fn get(&mut self, id: &ResourceId) -> CacheResult<Option<Resource>> {
        if let Some(resource) = self.store.get(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache hit");
            Ok(Some(resource.clone()))
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(id = %id, "Memory cache miss");
            Ok(None)
        }
    }

    fn contains(&self, id: &ResourceId) -> bool {
        self.store.contains(id)
    }

    async fn remove(&mut self, id: &ResourceId) -> CacheResult<bool> {
        Ok(self.store.remove(id).is_some())
    }

    async fn remove_oldest(&mut self) -> CacheResult<bool> {
        Ok(self.store.remove_oldest().is_some())
    }

    async fn clear(&mut self) -> CacheResult<()> {
        self.store.clear();
        debug!("Cleared memory cache");
        Ok(())
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.store.capacity()
    }

    async fn set_capacity(&mut self, capacity: usize) -> CacheResult<()> {
        let evicted = self.store.set_capacity(capacity);
        if !evicted.is_empty() {
            debug!(count = evicted.len(), capacity, "Shrunk memory cache");
        }
        Ok(())
    }

    /// Deserializes every persisted entry in `dir` into memory. Files that
    /// cannot be decoded are skipped.
    async fn scan(&mut self, dir: &Path) -> CacheResult<usize> {
        let mut scanned = Vec::new();
        for path in super::files_by_mtime(dir).await? {
            match persistence::read_entry(&path).await {
                Ok(Some(resource)) => {
                    let id = ResourceId::from_source(resource.source());
                    self.store.store(id.clone(), resource);
                    scanned.push(id);
                }
                Ok(None) => trace!(path = %path.display(), "File vanished during scan"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable cache file");
                }
            }
        }
        let loaded = scanned.iter().filter(|id| self.store.contains(id)).count();
        debug!(dir = %dir.display(), loaded, size = self.store.len(), "Scanned into memory cache");
        Ok(loaded)
    }

    fn entries(&self) -> Vec<(ResourceId, CachedPayload)> {
        self.snapshot()
            .into_iter()
            .map(|(id, resource)| (id, CachedPayload::Bytes(resource)))
            .collect()
    }
}
