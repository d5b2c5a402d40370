//! Port definition for fetching resources from their source.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Url;

use crate::domain::errors::CacheResult;

/// Per-request connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Overrides the fetcher's default timeout.
    pub timeout: Option<Duration>,
}

/// Raw bytes as returned by a fetcher, before content-type gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// Response body.
    pub data: Bytes,
    /// Reported or inferred content type.
    pub content_type: Option<String>,
}

/// Port for loading a resource from its source locator.
#[async_trait::async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetches the raw bytes behind `url`.
    async fn fetch(&self, url: &Url, options: &FetchOptions) -> CacheResult<FetchedResource>;
}
