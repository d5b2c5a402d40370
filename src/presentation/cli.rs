//! Command-line front end.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{Result, bail, eyre};
use reqwest::Url;
use tracing::info;

use crate::application::{ImageCache, ImageRequest, RequestEngine, RequestResult};
use crate::domain::ports::{CacheBackend, ResourceFetcher, Transform};
use crate::infrastructure::cache::{DiskCache, MemoryCache, persistence};
use crate::infrastructure::config::{AppConfig, BackendChoice, Command, FetchArgs, FlipAxis};
use crate::infrastructure::network::HttpFetcher;
use crate::infrastructure::transforms::{
    Brightness, CenterCrop, Contrast, Fit, Flip, GaussianBlur, Grayscale, Resize, Rotate,
};

/// Runs CLI commands against one cache.
#[derive(Debug, Clone)]
pub struct App {
    engine: RequestEngine,
}

impl App {
    /// Creates an app over an existing engine.
    #[must_use]
    pub const fn new(engine: RequestEngine) -> Self {
        Self { engine }
    }

    /// Builds the backend, cache and fetcher described by `config`.
    ///
    /// # Errors
    /// Returns error if the save directory cannot be scanned or the HTTP
    /// client cannot be created.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.network.fetcher_config())?);
        Self::with_fetcher(config, fetcher).await
    }

    /// Like [`App::from_config`] with a custom fetcher.
    ///
    /// # Errors
    /// Returns error if the save directory cannot be scanned.
    pub async fn with_fetcher(
        config: &AppConfig,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Result<Self> {
        let dir = config.cache.effective_directory();
        let capacity = config.cache.capacity;
        let backend: Box<dyn CacheBackend> = match config.cache.backend {
            BackendChoice::Memory => Box::new(MemoryCache::new(capacity)),
            BackendChoice::Disk => Box::new(DiskCache::new(dir.clone(), capacity)),
        };
        let cache = Arc::new(ImageCache::new(backend, config.cache.store_strategy));

        if config.cache.scan_on_start {
            let indexed = cache.scan(&dir).await?;
            info!(dir = %dir.display(), indexed, "Loaded cache index");
        }

        Ok(Self::new(RequestEngine::new(cache, fetcher)))
    }

    /// The engine requests run on.
    #[must_use]
    pub const fn engine(&self) -> &RequestEngine {
        &self.engine
    }

    /// Runs `command`, writing human readable output to `out`.
    ///
    /// # Errors
    /// Returns error if any request fails or the output cannot be written.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Fetch(args) => self.fetch(&args, out).await,
            Command::List => self.list(out).await,
            Command::Remove { locators } => self.remove(&locators, out).await,
            Command::Clear { purge } => self.clear(purge, out).await,
        }
    }

    async fn fetch<W: Write>(&self, args: &FetchArgs, out: &mut W) -> Result<()> {
        let transforms = build_transforms(args)?;
        let requests = args
            .locators
            .iter()
            .map(String::as_str)
            .map(build_request)
            .map(|request| {
                let mut request = request
                    .overwrite(args.overwrite)
                    .transforms(transforms.iter().cloned());
                for (name, value) in &args.headers {
                    request = request.header(name.clone(), value.clone());
                }
                request
            })
            .collect::<Vec<_>>();

        let results = self.engine.execute_all(&requests).await;

        if let Some(dir) = &args.output {
            std::fs::create_dir_all(dir)?;
        }

        let mut failed = 0;
        for (request, result) in requests.iter().zip(&results) {
            print_result(out, request, result)?;
            if result.is_failed() {
                failed += 1;
                continue;
            }
            if let (Some(dir), Some(output)) = (&args.output, result.output()) {
                let path = write_output(dir, result, output)?;
                writeln!(out, "  -> {}", path.display())?;
            }
        }

        if failed > 0 {
            bail!("{failed} of {} request(s) failed", results.len());
        }
        Ok(())
    }

    async fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        let cache = self.engine.cache();
        let entries = cache.entries().await;
        writeln!(
            out,
            "{} backend, {} of {} entries",
            cache.backend_kind().await,
            entries.len(),
            cache.capacity().await
        )?;

        for (id, payload) in entries {
            match persistence::resolve_payload(payload).await {
                Ok(resource) => writeln!(out, "{id}\t{}\t{}", resource.len(), resource.source())?,
                Err(e) => writeln!(out, "{id}\t-\t<unreadable: {e}>")?,
            }
        }
        Ok(())
    }

    async fn remove<W: Write>(&self, locators: &[String], out: &mut W) -> Result<()> {
        for locator in locators {
            let id = build_request(locator).id();
            let removed = self.engine.cache().remove(&id).await?;
            let status = if removed { "removed" } else { "not cached" };
            writeln!(out, "{status}\t{id}\t{locator}")?;
        }
        Ok(())
    }

    async fn clear<W: Write>(&self, purge: bool, out: &mut W) -> Result<()> {
        let cache = self.engine.cache();
        let count = cache.len().await;
        if purge {
            for (id, _) in cache.entries().await {
                cache.remove(&id).await?;
            }
        } else {
            cache.clear().await?;
        }
        let verb = if purge { "Purged" } else { "Forgot" };
        writeln!(out, "{verb} {count} entries")?;
        Ok(())
    }
}

/// Treats anything that is not an absolute URL as a local path.
fn build_request(locator: &str) -> ImageRequest {
    if Url::parse(locator).is_ok() {
        return ImageRequest::new(locator);
    }
    ImageRequest::from_path(locator).unwrap_or_else(|_| ImageRequest::new(locator))
}

fn build_transforms(args: &FetchArgs) -> Result<Vec<Arc<dyn Transform>>> {
    let mut transforms: Vec<Arc<dyn Transform>> = Vec::new();
    if let Some((width, height)) = args.crop {
        transforms.push(Arc::new(CenterCrop::new(width, height)));
    }
    if let Some((width, height)) = args.resize {
        transforms.push(Arc::new(Resize::new(width, height)));
    }
    if let Some((width, height)) = args.fit {
        transforms.push(Arc::new(Fit::new(width, height)));
    }
    if let Some(degrees) = args.rotate {
        let rotate = Rotate::from_degrees(degrees)
            .ok_or_else(|| eyre!("rotation must be a multiple of 90 degrees, got {degrees}"))?;
        transforms.push(Arc::new(rotate));
    }
    if let Some(axis) = args.flip {
        transforms.push(Arc::new(match axis {
            FlipAxis::Horizontal => Flip::Horizontal,
            FlipAxis::Vertical => Flip::Vertical,
        }));
    }
    if args.grayscale {
        transforms.push(Arc::new(Grayscale));
    }
    if let Some(sigma) = args.blur {
        transforms.push(Arc::new(GaussianBlur::new(sigma)));
    }
    if let Some(value) = args.brightness {
        transforms.push(Arc::new(Brightness::new(value)));
    }
    if let Some(amount) = args.contrast {
        transforms.push(Arc::new(Contrast::new(amount)));
    }
    Ok(transforms)
}

fn print_result<W: Write>(out: &mut W, request: &ImageRequest, result: &RequestResult) -> Result<()> {
    match result.error() {
        Some(error) => writeln!(out, "{}\t{}\t{}", result.state(), request.locator(), error)?,
        None => writeln!(
            out,
            "{}\t{}\t{} bytes",
            result.state(),
            request.locator(),
            result.output().map_or(0, bytes::Bytes::len)
        )?,
    }
    Ok(())
}

fn write_output(dir: &Path, result: &RequestResult, output: &[u8]) -> Result<std::path::PathBuf> {
    let extension = image::guess_format(output)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin");
    let path = dir.join(format!("{}.{extension}", result.id()));
    std::fs::write(&path, output)?;
    Ok(path)
}
