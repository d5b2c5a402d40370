//! Infrastructure layer with external service adapters.

/// Cache backends and the persisted entry format.
pub mod cache;
/// Application configuration.
pub mod config;
/// Resource fetchers.
pub mod network;
/// Image transforms.
pub mod transforms;

pub use cache::{CacheStats, ClearPolicy, DiskCache, MemoryCache};
pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use network::{FetcherConfig, HttpFetcher};
