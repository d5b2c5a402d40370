//! Request lifecycle and persistence policy.

use serde::{Deserialize, Serialize};

/// State of one request execution.
///
/// `Ready -> Started -> {Failed | Succeeded | CacheHit}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestState {
    /// Not executed yet.
    #[default]
    Ready,
    /// Execution in progress.
    Started,
    /// Execution failed; the result carries the cause.
    Failed,
    /// The resource was fetched from its source.
    Succeeded,
    /// The resource was found in the cache; no fetch happened.
    CacheHit,
}

impl RequestState {
    /// Returns true for `Succeeded` and `CacheHit`.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeeded | Self::CacheHit)
    }

    /// Returns true for `Failed`.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns true once no further transition can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Succeeded | Self::CacheHit)
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Started => write!(f, "started"),
            Self::Failed => write!(f, "failed"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::CacheHit => write!(f, "cache hit"),
        }
    }
}

/// Which payload is persisted after a successful request.
///
/// Only one of the two is ever stored. Without transforms both are the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStrategy {
    /// Persist the bytes as fetched (or as found in the cache).
    #[default]
    Original,
    /// Persist the transform pipeline's output.
    Transformed,
}
