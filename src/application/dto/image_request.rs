//! Request description DTO.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image::ImageFormat;
use reqwest::Url;

use crate::domain::entities::{ResourceId, StoreStrategy};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{FetchOptions, Transform};

/// Locator schemes a request may use.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Immutable description of one resource request.
///
/// A request can be executed any number of times, sequentially or
/// concurrently; every execution produces its own result.
#[derive(Clone)]
pub struct ImageRequest {
    locator: String,
    overwrite: bool,
    transforms: Vec<Arc<dyn Transform>>,
    store_strategy: Option<StoreStrategy>,
    output_format: ImageFormat,
    fetch_options: FetchOptions,
}

impl ImageRequest {
    /// Creates a request for `locator`. The locator is validated on execution.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            overwrite: false,
            transforms: Vec::new(),
            store_strategy: None,
            output_format: ImageFormat::Png,
            fetch_options: FetchOptions::default(),
        }
    }

    /// Creates a request for a local file.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidSource`] if the path cannot be expressed
    /// as a `file:` URL.
    pub fn from_path(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|e| {
            CacheError::invalid_source(format!("cannot resolve {}: {e}", path.display()))
        })?;
        let url = Url::from_file_path(&absolute).map_err(|()| {
            CacheError::invalid_source(format!("{} is not a valid file path", absolute.display()))
        })?;
        Ok(Self::new(url.as_str()))
    }

    /// Always fetch from the source, skipping the cache lookup.
    #[must_use]
    pub const fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Appends a transform.
    #[must_use]
    pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// Appends several shared transforms, keeping their order.
    #[must_use]
    pub fn transforms(mut self, transforms: impl IntoIterator<Item = Arc<dyn Transform>>) -> Self {
        self.transforms.extend(transforms);
        self
    }

    /// Overrides the cache's store strategy for this request.
    #[must_use]
    pub const fn store_strategy(mut self, strategy: StoreStrategy) -> Self {
        self.store_strategy = Some(strategy);
        self
    }

    /// Sets the format transformed output is encoded in.
    #[must_use]
    pub const fn output_format(mut self, format: ImageFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Adds a request header sent by network fetchers.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fetch_options.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the fetch timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.fetch_options.timeout = Some(timeout);
        self
    }

    /// The raw locator string.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// The cache identifier derived from the locator.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        ResourceId::from_source(&self.locator)
    }

    /// Parses and validates the locator.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidSource`] for an empty, unparseable or
    /// unsupported locator.
    pub fn url(&self) -> CacheResult<Url> {
        let locator = self.locator.trim();
        if locator.is_empty() {
            return Err(CacheError::invalid_source("empty locator"));
        }

        let url = Url::parse(locator)
            .map_err(|e| CacheError::invalid_source(format!("{locator}: {e}")))?;
        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(CacheError::invalid_source(format!(
                "unsupported scheme {} in {locator}",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Returns true if the cache lookup is skipped.
    #[must_use]
    pub const fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    /// Transforms in application order.
    #[must_use]
    pub fn transform_list(&self) -> &[Arc<dyn Transform>] {
        &self.transforms
    }

    /// The per-request store strategy, if overridden.
    #[must_use]
    pub const fn store_strategy_override(&self) -> Option<StoreStrategy> {
        self.store_strategy
    }

    /// The format transformed output is encoded in.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.output_format
    }

    /// Options passed to the fetcher.
    #[must_use]
    pub const fn fetch_options(&self) -> &FetchOptions {
        &self.fetch_options
    }
}

impl std::fmt::Debug for ImageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transforms: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("ImageRequest")
            .field("locator", &self.locator)
            .field("overwrite", &self.overwrite)
            .field("transforms", &transforms)
            .field("store_strategy", &self.store_strategy)
            .field("output_format", &self.output_format)
            .finish_non_exhaustive()
    }
}
