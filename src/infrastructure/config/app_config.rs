//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::entities::StoreStrategy;
use crate::infrastructure::cache::{DEFAULT_CAPACITY, default_cache_dir};
use crate::infrastructure::network::FetcherConfig;

use super::args::CliArgs;

const APP_NAME: &str = "mediacache";
const APP_QUALIFIER: &str = "io";
const APP_ORGANIZATION: &str = "mediacache";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Which cache backend to run with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Entries held in process memory.
    Memory,
    /// One persisted file per entry.
    #[default]
    Disk,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log verbosity level.
    pub log_level: LogLevel,

    /// Log file path. Logs go to stderr when unset.
    pub log_path: Option<PathBuf>,

    /// Cache configuration.
    pub cache: CacheConfig,

    /// Network configuration.
    pub network: NetworkConfig,
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Active backend.
    pub backend: BackendChoice,

    /// Save directory for the disk backend.
    pub directory: Option<PathBuf>,

    /// Maximum number of entries.
    pub capacity: usize,

    /// Which payload successful requests store.
    pub store_strategy: StoreStrategy,

    /// Rebuild the index from the save directory on startup.
    pub scan_on_start: bool,
}

impl CacheConfig {
    /// Returns the configured save directory, or the default one.
    #[must_use]
    pub fn effective_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_cache_dir)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: BackendChoice::default(),
            directory: None,
            capacity: DEFAULT_CAPACITY,
            store_strategy: StoreStrategy::default(),
            scan_on_start: true,
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// `User-Agent` header value.
    pub user_agent: String,
}

impl NetworkConfig {
    /// Builds the fetcher configuration.
    #[must_use]
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout_secs: self.timeout_secs,
            user_agent: self.user_agent.clone(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let defaults = FetcherConfig::default();
        Self {
            timeout_secs: defaults.timeout_secs,
            user_agent: defaults.user_agent,
        }
    }
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(backend) = args.backend {
            self.cache.backend = backend;
        }
        if let Some(dir) = &args.cache_dir {
            self.cache.directory = Some(dir.clone());
        }
        if let Some(capacity) = args.capacity {
            self.cache.capacity = capacity;
        }
        if let Some(strategy) = args.store_strategy {
            self.cache.store_strategy = strategy.into();
        }
        if args.no_scan {
            self.cache.scan_on_start = false;
        }
        if let Some(timeout) = args.timeout {
            self.network.timeout_secs = timeout;
        }
    }

    /// Returns the platform config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_level: LogLevel::Info,
            log_path: None,
            cache: CacheConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [cache]
            backend = "memory"
            capacity = 5
            store_strategy = "transformed"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.cache.backend, BackendChoice::Memory);
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.cache.store_strategy, StoreStrategy::Transformed);
        assert!(config.cache.scan_on_start);
        assert_eq!(config.network, NetworkConfig::default());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.cache.backend, BackendChoice::Disk);
        assert_eq!(config.cache.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.cache.store_strategy, StoreStrategy::Original);
        assert_eq!(config.network.timeout_secs, 30);
        assert!(config.network.user_agent.starts_with("mediacache/"));
        assert_eq!(config.cache.effective_directory(), default_cache_dir());
    }

    #[test]
    fn test_default_config_survives_toml() {
        let config = AppConfig::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_merge_with_args() {
        let args = CliArgs::parse_from([
            "mediacache",
            "--backend",
            "memory",
            "--capacity",
            "7",
            "--store-strategy",
            "transformed",
            "--cache-dir",
            "/tmp/elsewhere",
            "--no-scan",
            "--timeout",
            "5",
            "list",
        ]);
        let mut config = AppConfig::default();

        config.merge_with_args(&args);

        assert_eq!(config.cache.backend, BackendChoice::Memory);
        assert_eq!(config.cache.capacity, 7);
        assert_eq!(config.cache.store_strategy, StoreStrategy::Transformed);
        assert_eq!(
            config.cache.effective_directory(),
            PathBuf::from("/tmp/elsewhere")
        );
        assert!(!config.cache.scan_on_start);
        assert_eq!(config.network.fetcher_config().timeout_secs, 5);
    }
}
