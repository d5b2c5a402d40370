//! Domain layer with core cache entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CachedPayload, MediaType, RequestState, Resource, ResourceId, StoreStrategy};
pub use errors::{CacheError, CacheResult};
pub use ports::{CacheBackend, ResourceFetcher, Transform};
