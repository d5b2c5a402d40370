//! Disk-based resource cache for persistence across sessions.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::{CachedPayload, Resource, ResourceId};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{BackendKind, CacheBackend};

use super::bounded_store::BoundedStore;
use super::{DEFAULT_CAPACITY, default_cache_dir, files_by_mtime, persistence};

/// What happens to tracked entries when the save directory changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearPolicy {
    /// Keep the index as is.
    #[default]
    Keep,
    /// Drop entries from the index, leave their files on disk.
    Forget,
    /// Drop entries from the index and delete their files.
    Purge,
}

/// Disk-based cache that indexes one persisted file per entry.
///
/// Only file paths are held in memory. The index is not populated from an
/// existing directory on construction; call [`CacheBackend::scan`] (or
/// [`DiskCache::rescan`]) to rebuild it.
pub struct DiskCache {
    store: BoundedStore<PathBuf>,
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Creates an empty cache saving into `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: PathBuf, capacity: usize) -> Self {
        Self {
            store: BoundedStore::new(capacity),
            cache_dir,
        }
    }

    /// Creates a cache in the default location (`~/.mediacache`).
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(default_cache_dir(), DEFAULT_CAPACITY)
    }

    /// The directory new entries are written to.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path for a cached entry.
    fn cache_path(&self, id: &ResourceId) -> PathBuf {
        self.cache_dir.join(id.as_str())
    }

    /// Rebuilds the index from the current save directory.
    ///
    /// # Errors
    /// Returns error if the directory cannot be read.
    pub async fn rescan(&mut self) -> CacheResult<usize> {
        let dir = self.cache_dir.clone();
        self.scan(&dir).await
    }

    /// Empties the index according to `policy`.
    ///
    /// With [`ClearPolicy::Purge`] every file is attempted even if one fails;
    /// the first failure is returned.
    ///
    /// # Errors
    /// Returns [`CacheError::FileDeletionFailed`] if a file cannot be deleted.
    pub async fn clear_with(&mut self, policy: ClearPolicy) -> CacheResult<()> {
        match policy {
            ClearPolicy::Keep => Ok(()),
            ClearPolicy::Forget => {
                self.store.clear();
                debug!(dir = %self.cache_dir.display(), "Cleared disk cache index");
                Ok(())
            }
            ClearPolicy::Purge => {
                let drained = self.store.drain();
                let count = drained.len();
                let result = delete_all(drained).await;
                debug!(dir = %self.cache_dir.display(), count, "Purged disk cache");
                result
            }
        }
    }

    /// Switches the save directory after applying `policy` to the entries
    /// tracked so far. The directory is left unchanged if the policy fails.
    ///
    /// # Errors
    /// Returns error if purging old files fails.
    pub async fn change_directory(
        &mut self,
        cache_dir: PathBuf,
        policy: ClearPolicy,
    ) -> CacheResult<()> {
        self.clear_with(policy).await?;
        debug!(
            from = %self.cache_dir.display(),
            to = %cache_dir.display(),
            ?policy,
            "Changed disk cache directory"
        );
        self.cache_dir = cache_dir;
        Ok(())
    }
}

impl Default for DiskCache {
    fn default() -> Self {
        Self::default_location()
    }
}

impl std::fmt::Debug for DiskCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCache")
            .field("cache_dir", &self.cache_dir)
            .field("store", &self.store)
            .finish()
    }
}

#[async_trait::async_trait]
impl CacheBackend for DiskCache {
    fn kind(&self) -> BackendKind {
        BackendKind::Disk
    }

    /// Writes the entry file first and indexes it only once the write
    /// succeeded.
    async fn store(&mut self, id: ResourceId, resource: Resource) -> CacheResult<()> {
        if self.store.capacity() == 0 {
            return Ok(());
        }

        fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            CacheError::serialization(format!(
                "Failed to create cache dir {}: {e}",
                self.cache_dir.display()
            ))
        })?;

        let path = self.cache_path(&id);
        persistence::write_entry(&path, &resource).await?;
        debug!(id = %id, path = %path.display(), size = resource.len(), "Stored resource in disk cache");

        if let Some((evicted, old_path)) = self.store.store(id, path) {
            match delete_file(&old_path).await {
                Ok(()) => debug!(id = %evicted, "Evicted from disk cache"),
                Err(e) => warn!(id = %evicted, error = %e, "Failed to delete evicted cache file"),
            }
        }
        Ok(())
    }

    /// A file deleted behind the cache's back counts as absent and drops the
    /// dangling index entry.
    async fn get(&mut self, id: &ResourceId) -> CacheResult<Option<Resource>> {
        let Some(path) = self.store.get(id).cloned() else {
            trace!(id = %id, "Disk cache miss");
            return Ok(None);
        };

        if let Some(resource) = persistence::read_entry(&path).await? {
            trace!(id = %id, path = %path.display(), "Disk cache hit");
            Ok(Some(resource))
        } else {
            warn!(id = %id, path = %path.display(), "Cache file disappeared, dropping entry");
            self.store.remove(id);
            Ok(None)
        }
    }

    fn contains(&self, id: &ResourceId) -> bool {
        self.store.contains(id)
    }

    /// The index entry is dropped even when its file cannot be deleted; the
    /// failure is reported as [`CacheError::FileDeletionFailed`].
    async fn remove(&mut self, id: &ResourceId) -> CacheResult<bool> {
        let Some(path) = self.store.remove(id) else {
            return Ok(false);
        };
        delete_file(&path).await?;
        debug!(id = %id, "Removed from disk cache");
        Ok(true)
    }

    async fn remove_oldest(&mut self) -> CacheResult<bool> {
        let Some((id, path)) = self.store.remove_oldest() else {
            return Ok(false);
        };
        delete_file(&path).await?;
        debug!(id = %id, "Removed oldest from disk cache");
        Ok(true)
    }

    /// Forgets every entry; files stay on disk. See [`DiskCache::clear_with`].
    async fn clear(&mut self) -> CacheResult<()> {
        self.clear_with(ClearPolicy::Forget).await
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.store.capacity()
    }

    async fn set_capacity(&mut self, capacity: usize) -> CacheResult<()> {
        let evicted = self.store.set_capacity(capacity);
        if evicted.is_empty() {
            return Ok(());
        }
        debug!(count = evicted.len(), capacity, "Shrinking disk cache");
        delete_all(evicted).await
    }

    /// Indexes every file in `dir` under its file name, oldest modification
    /// first. Once full, each insertion drops the oldest entry from the index;
    /// the directory itself is left as found.
    async fn scan(&mut self, dir: &Path) -> CacheResult<usize> {
        if self.store.capacity() == 0 {
            return Ok(0);
        }

        let mut scanned = Vec::new();
        for path in files_by_mtime(dir).await? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "Skipping cache file with non UTF-8 name");
                continue;
            };
            let id = ResourceId::new(name);
            if let Some((evicted, _)) = self.store.store(id.clone(), path.clone()) {
                trace!(id = %evicted, "Dropped from index during scan");
            }
            scanned.push(id);
        }

        let indexed = scanned.iter().filter(|id| self.store.contains(id)).count();
        debug!(dir = %dir.display(), indexed, size = self.store.len(), "Scanned disk cache");
        Ok(indexed)
    }

    fn entries(&self) -> Vec<(ResourceId, CachedPayload)> {
        self.store
            .iter()
            .map(|(id, path)| (id.clone(), CachedPayload::File(path.clone())))
            .collect()
    }
}

/// Deletes a cache file. A file that is already gone counts as deleted.
async fn delete_file(path: &Path) -> CacheResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::deletion(path, e.to_string())),
    }
}

/// Deletes every file, returning the first failure.
async fn delete_all(entries: Vec<(ResourceId, PathBuf)>) -> CacheResult<()> {
    let mut first_error = None;
    for (id, path) in entries {
        if let Err(e) = delete_file(&path).await {
            warn!(id = %id, error = %e, "Failed to delete cache file");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn create_test_cache(capacity: usize) -> (DiskCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskCache::new(temp_dir.path().join("cache"), capacity);
        (cache, temp_dir)
    }

    fn resource(source: &str) -> Resource {
        Resource::new(source, format!("bytes of {source}").into_bytes())
    }

    async fn put(cache: &mut DiskCache, source: &str) -> ResourceId {
        let id = ResourceId::from_source(source);
        cache.store(id.clone(), resource(source)).await.unwrap();
        id
    }

    /// Persists an entry directly and backdates it by `age`.
    async fn persist(dir: &Path, source: &str, age: Duration) -> ResourceId {
        std::fs::create_dir_all(dir).unwrap();
        let id = ResourceId::from_source(source);
        let path = dir.join(id.as_str());
        persistence::write_entry(&path, &resource(source)).await.unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        id
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "https://example.com/a.png").await;

        assert!(cache.cache_dir().join(id.as_str()).exists());
        let retrieved = cache.get(&id).await.unwrap();
        assert_eq!(retrieved, Some(resource("https://example.com/a.png")));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (mut cache, _temp) = create_test_cache(10);
        let result = cache.get(&ResourceId::new("nonexistent")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_zero_capacity_writes_nothing() {
        let (mut cache, _temp) = create_test_cache(0);
        let id = put(&mut cache, "A").await;

        assert!(cache.is_empty());
        assert!(!cache.cache_dir().join(id.as_str()).exists());
    }

    #[tokio::test]
    async fn test_eviction_deletes_oldest_file() {
        let (mut cache, _temp) = create_test_cache(2);
        let a = put(&mut cache, "A").await;
        let b = put(&mut cache, "B").await;
        let c = put(&mut cache, "C").await;

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&a));
        assert!(!cache.cache_dir().join(a.as_str()).exists());
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[tokio::test]
    async fn test_remove() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "A").await;

        assert!(cache.remove(&id).await.unwrap());
        assert!(!cache.contains(&id));
        assert!(!cache.cache_dir().join(id.as_str()).exists());
        assert!(!cache.remove(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_tolerates_externally_deleted_file() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "A").await;
        std::fs::remove_file(cache.cache_dir().join(id.as_str())).unwrap();

        assert!(cache.remove(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_reports_deletion_failure() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "A").await;
        let path = cache.cache_dir().join(id.as_str());
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = cache.remove(&id).await.unwrap_err();

        assert!(matches!(err, CacheError::FileDeletionFailed { .. }));
        assert!(!cache.contains(&id));
    }

    #[tokio::test]
    async fn test_get_drops_dangling_entry() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "A").await;
        std::fs::remove_file(cache.cache_dir().join(id.as_str())).unwrap();

        assert_eq!(cache.get(&id).await, Ok(None));
        assert!(!cache.contains(&id));
    }

    #[tokio::test]
    async fn test_get_reports_corrupt_file() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "A").await;
        let path = cache.cache_dir().join(id.as_str());
        let mut raw = std::fs::read(&path).unwrap();
        raw[0] = 42;
        std::fs::write(&path, raw).unwrap();

        let err = cache.get(&id).await.unwrap_err();
        assert!(matches!(err, CacheError::VersionMismatch { found: 42, .. }));
        assert!(cache.contains(&id));
    }

    #[tokio::test]
    async fn test_overwrite_keeps_eviction_slot() {
        let (mut cache, _temp) = create_test_cache(2);
        let a = put(&mut cache, "A").await;
        let b = put(&mut cache, "B").await;

        cache
            .store(a.clone(), Resource::new("A", b"rewritten".to_vec()))
            .await
            .unwrap();
        let c = put(&mut cache, "C").await;

        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[tokio::test]
    async fn test_scan_respects_capacity_and_mtime() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();
        let oldest = persist(&dir, "oldest", Duration::from_secs(300)).await;
        let middle = persist(&dir, "middle", Duration::from_secs(200)).await;
        let newest = persist(&dir, "newest", Duration::from_secs(100)).await;

        let mut cache = DiskCache::new(dir.clone(), 2);
        assert_eq!(cache.len(), 0);

        cache.rescan().await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&oldest));
        assert!(dir.join(oldest.as_str()).exists());
        let ids: Vec<ResourceId> = cache.entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![middle.clone(), newest]);
        assert_eq!(
            cache.get(&middle).await.unwrap(),
            Some(resource("middle"))
        );
    }

    #[tokio::test]
    async fn test_scan_past_capacity_leaves_files_in_place() {
        let (mut first, _temp) = create_test_cache(10);
        let a = put(&mut first, "A").await;
        put(&mut first, "B").await;
        put(&mut first, "C").await;

        let mut second = DiskCache::new(first.cache_dir().to_path_buf(), 2);
        assert_eq!(second.rescan().await.unwrap(), 2);

        let files = std::fs::read_dir(first.cache_dir()).unwrap().count();
        assert_eq!(files, 3);
        assert!(first.contains(&a));
        assert_eq!(first.get(&a).await.unwrap(), Some(resource("A")));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_index_untouched() {
        let (mut cache, temp) = create_test_cache(10);
        let a = put(&mut cache, "A").await;

        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        cache
            .change_directory(blocker.join("sub"), ClearPolicy::Keep)
            .await
            .unwrap();

        let b = ResourceId::from_source("B");
        let result = cache.store(b.clone(), resource("B")).await;

        assert!(matches!(result, Err(CacheError::SerializationFailed { .. })));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&b));
        assert_eq!(cache.get(&a).await.unwrap(), Some(resource("A")));
    }

    #[tokio::test]
    async fn test_instances_share_directory_only_after_scan() {
        let (mut first, _temp) = create_test_cache(10);
        let id = put(&mut first, "A").await;

        let mut second = DiskCache::new(first.cache_dir().to_path_buf(), 10);
        assert!(!second.contains(&id));
        assert_eq!(second.get(&id).await, Ok(None));

        assert_eq!(second.rescan().await.unwrap(), 1);
        assert_eq!(second.get(&id).await.unwrap(), Some(resource("A")));
    }

    #[tokio::test]
    async fn test_scan_with_zero_capacity_keeps_files() {
        let temp = TempDir::new().unwrap();
        let id = persist(temp.path(), "A", Duration::from_secs(10)).await;

        let mut cache = DiskCache::new(temp.path().to_path_buf(), 0);
        assert_eq!(cache.rescan().await.unwrap(), 0);
        assert!(temp.path().join(id.as_str()).exists());
    }

    #[tokio::test]
    async fn test_set_capacity_deletes_evicted_files() {
        let (mut cache, _temp) = create_test_cache(3);
        let a = put(&mut cache, "A").await;
        let b = put(&mut cache, "B").await;
        let c = put(&mut cache, "C").await;

        cache.set_capacity(1).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&c));
        for gone in [a, b] {
            assert!(!cache.cache_dir().join(gone.as_str()).exists());
        }
    }

    #[tokio::test]
    async fn test_change_directory_policies() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");

        let mut cache = DiskCache::new(first.clone(), 10);
        let a = put(&mut cache, "A").await;

        cache
            .change_directory(second.clone(), ClearPolicy::Keep)
            .await
            .unwrap();
        assert!(cache.contains(&a));
        assert_eq!(cache.cache_dir(), second.as_path());

        let b = put(&mut cache, "B").await;
        assert!(second.join(b.as_str()).exists());

        cache
            .change_directory(first.clone(), ClearPolicy::Forget)
            .await
            .unwrap();
        assert!(cache.is_empty());
        assert!(first.join(a.as_str()).exists());

        let c = put(&mut cache, "C").await;
        cache
            .change_directory(second.clone(), ClearPolicy::Purge)
            .await
            .unwrap();
        assert!(cache.is_empty());
        assert!(!first.join(c.as_str()).exists());
        assert!(first.join(a.as_str()).exists());
    }

    #[tokio::test]
    async fn test_clear_keeps_files() {
        let (mut cache, _temp) = create_test_cache(10);
        let id = put(&mut cache, "A").await;

        cache.clear().await.unwrap();

        assert!(cache.is_empty());
        assert!(cache.cache_dir().join(id.as_str()).exists());
    }
}
