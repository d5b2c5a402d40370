//! Cache backends.
//!
//! This module provides:
//! - A bounded FIFO store shared by both backends
//! - An in-memory backend
//! - A disk backend persisting one file per entry
//! - The binary entry format used on disk

pub mod bounded_store;
pub mod disk_cache;
pub mod memory_cache;
pub mod persistence;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;

use crate::domain::errors::{CacheError, CacheResult};

pub use bounded_store::BoundedStore;
pub use disk_cache::{ClearPolicy, DiskCache};
pub use memory_cache::{CacheStats, MemoryCache};

/// Default maximum number of entries, for both backends.
pub const DEFAULT_CAPACITY: usize = 100;

/// Returns the default save directory (`~/.mediacache`).
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || std::env::temp_dir().join("mediacache"),
        |dirs| dirs.home_dir().join(".mediacache"),
    )
}

/// Lists the regular files directly under `dir`, oldest modification first.
///
/// A missing directory yields an empty list.
pub(crate) async fn files_by_mtime(dir: &Path) -> CacheResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CacheError::io(format!(
                "Failed to read cache dir {}: {e}",
                dir.display()
            )));
        }
    };

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CacheError::io(format!("Failed to read entry: {e}")))?
    {
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if meta.is_dir() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((modified, entry.path()));
    }

    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}
