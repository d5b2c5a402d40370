mod cache_backend_port;
mod fetcher_port;
mod transform_port;

pub use cache_backend_port::{BackendKind, CacheBackend};
pub use fetcher_port::{FetchOptions, FetchedResource, ResourceFetcher};
pub use transform_port::Transform;
