//! Request execution state machine.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::join_all;
use reqwest::Url;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::dto::{ImageRequest, RequestResult};
use crate::domain::entities::{MediaType, Resource, ResourceId, StoreStrategy};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::ResourceFetcher;

use super::image_cache::ImageCache;
use super::transform_pipeline::TransformPipeline;

/// Executes [`ImageRequest`]s against a cache and a fetcher.
///
/// Execution order for one request: validate the locator, look the
/// resource up (unless overwriting), fetch on a miss, gate the content
/// type, run the transforms and store the selected payload back. Every
/// failure is captured in the returned [`RequestResult`].
#[derive(Clone)]
pub struct RequestEngine {
    cache: Arc<ImageCache>,
    fetcher: Arc<dyn ResourceFetcher>,
}

/// What a failed step had produced so far.
#[derive(Default)]
struct Partial {
    source: Option<Resource>,
    output: Option<Bytes>,
}

impl RequestEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(cache: Arc<ImageCache>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// The cache requests are served from.
    #[must_use]
    pub const fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    /// Executes `request` to completion.
    pub async fn execute(&self, request: &ImageRequest) -> RequestResult {
        self.execute_with(request, |_| {}).await
    }

    /// Executes `request`, reporting the started and the terminal result to
    /// `observer`.
    pub async fn execute_with<F>(&self, request: &ImageRequest, mut observer: F) -> RequestResult
    where
        F: FnMut(&RequestResult),
    {
        let id = request.id();
        observer(&RequestResult::started(id.clone()));

        let result = match self.run(request, &id).await {
            Ok((source, output, cache_hit)) => {
                RequestResult::completed(id, source, output, cache_hit)
            }
            Err((error, partial)) => {
                warn!(locator = request.locator(), error = %error, "Request failed");
                RequestResult::failed(id, error, partial.source, partial.output)
            }
        };

        debug!(id = %result.id(), state = %result.state(), "Request finished");
        observer(&result);
        result
    }

    /// Executes `request` on a spawned task. `observer` sees the same
    /// results as with [`RequestEngine::execute_with`]; the handle resolves
    /// to the terminal result.
    pub fn execute_async<F>(&self, request: ImageRequest, observer: F) -> JoinHandle<RequestResult>
    where
        F: FnMut(&RequestResult) + Send + 'static,
    {
        let engine = self.clone();
        tokio::spawn(async move { engine.execute_with(&request, observer).await })
    }

    /// Executes every request concurrently. Results keep the input order.
    pub async fn execute_all(&self, requests: &[ImageRequest]) -> Vec<RequestResult> {
        let results = join_all(requests.iter().map(|request| self.execute(request))).await;
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(total = results.len(), succeeded, "Batch finished");
        results
    }

    async fn run(
        &self,
        request: &ImageRequest,
        id: &ResourceId,
    ) -> Result<(Resource, Bytes, bool), (CacheError, Partial)> {
        let url = request.url().map_err(bare)?;

        let cached = if request.is_overwrite() {
            debug!(id = %id, "Overwrite requested, skipping cache lookup");
            None
        } else {
            self.cache.lookup(id).await.map_err(bare)?
        };

        let cache_hit = cached.is_some();
        let source = match cached {
            Some(resource) => resource,
            None => self.fetch(&url, request).await.map_err(bare)?,
        };

        let pipeline = TransformPipeline::new(request.transform_list().to_vec(), request.format());
        let output = match pipeline.run(source.data().clone()).await {
            Ok(output) => output,
            Err(e) => {
                let partial = Partial {
                    source: Some(source),
                    output: None,
                };
                return Err((e, partial));
            }
        };

        let strategy = request
            .store_strategy_override()
            .unwrap_or_else(|| self.cache.store_strategy());
        let payload = match strategy {
            StoreStrategy::Original => source.clone(),
            StoreStrategy::Transformed => source.with_data(output.clone()),
        };
        if let Err(e) = self.cache.store(id.clone(), payload).await {
            let partial = Partial {
                source: Some(source),
                output: Some(output),
            };
            return Err((e, partial));
        }

        Ok((source, output, cache_hit))
    }

    async fn fetch(&self, url: &Url, request: &ImageRequest) -> CacheResult<Resource> {
        debug!(url = %url, "Fetching resource");
        let fetched = self.fetcher.fetch(url, request.fetch_options()).await?;
        MediaType::verify(fetched.content_type.as_deref(), url)?;
        Ok(Resource::new(request.locator(), fetched.data))
    }
}

fn bare(error: CacheError) -> (CacheError, Partial) {
    (error, Partial::default())
}

impl std::fmt::Debug for RequestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestEngine")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
