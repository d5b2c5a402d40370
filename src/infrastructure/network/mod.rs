//! Network adapters for fetching resources.

pub mod http_fetcher;

pub use http_fetcher::{FetcherConfig, HttpFetcher};
