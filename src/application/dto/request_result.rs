//! Per-execution request result.

use bytes::Bytes;

use crate::domain::entities::{RequestState, Resource, ResourceId};
use crate::domain::errors::CacheError;

/// Outcome of one request execution.
///
/// Which parts are populated depends on the state: a failed execution keeps
/// whatever source and output it had produced before the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    state: RequestState,
    id: ResourceId,
    source: Option<Resource>,
    output: Option<Bytes>,
    error: Option<CacheError>,
}

impl RequestResult {
    pub(crate) fn started(id: ResourceId) -> Self {
        Self {
            state: RequestState::Started,
            id,
            source: None,
            output: None,
            error: None,
        }
    }

    pub(crate) fn completed(
        id: ResourceId,
        source: Resource,
        output: Bytes,
        cache_hit: bool,
    ) -> Self {
        Self {
            state: if cache_hit {
                RequestState::CacheHit
            } else {
                RequestState::Succeeded
            },
            id,
            source: Some(source),
            output: Some(output),
            error: None,
        }
    }

    pub(crate) fn failed(
        id: ResourceId,
        error: CacheError,
        source: Option<Resource>,
        output: Option<Bytes>,
    ) -> Self {
        Self {
            state: RequestState::Failed,
            id,
            source,
            output,
            error: Some(error),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RequestState {
        self.state
    }

    /// Identifier of the requested resource.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        &self.id
    }

    /// The source resource, as fetched or read from the cache.
    #[must_use]
    pub const fn source(&self) -> Option<&Resource> {
        self.source.as_ref()
    }

    /// The transformed bytes, or the source bytes if there were no transforms.
    #[must_use]
    pub const fn output(&self) -> Option<&Bytes> {
        self.output.as_ref()
    }

    /// The failure cause.
    #[must_use]
    pub const fn error(&self) -> Option<&CacheError> {
        self.error.as_ref()
    }

    /// Returns true for [`RequestState::Succeeded`] and [`RequestState::CacheHit`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.state.is_success()
    }

    /// Returns true for [`RequestState::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.state.is_failed()
    }

    /// Returns true if the source came from the cache.
    #[must_use]
    pub const fn is_cache_hit(&self) -> bool {
        matches!(self.state, RequestState::CacheHit)
    }
}
