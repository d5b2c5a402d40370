//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors raised by the cache, its backends and the request engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CacheError {
    #[error("invalid source locator: {reason}")]
    InvalidSource { reason: String },

    #[error("unsupported content type {content_type} for {locator}")]
    UnsupportedContentType {
        content_type: String,
        locator: String,
    },

    #[error("failed to fetch {locator}: {message}")]
    FetchFailed { locator: String, message: String },

    #[error("failed to serialize cache entry: {message}")]
    SerializationFailed { message: String },

    #[error("failed to deserialize cache entry: {message}")]
    DeserializationFailed { message: String },

    #[error("unsupported cache file version {found}, expected {expected}")]
    VersionMismatch { found: u8, expected: u8 },

    #[error("failed to delete {path}: {message}")]
    FileDeletionFailed { path: String, message: String },

    #[error("transform failed: {message}")]
    TransformFailed { message: String },

    #[error("io error: {message}")]
    Io { message: String },
}

impl CacheError {
    /// Creates invalid source error.
    #[must_use]
    pub fn invalid_source(reason: impl Into<String>) -> Self {
        Self::InvalidSource {
            reason: reason.into(),
        }
    }

    /// Creates unsupported content type error.
    #[must_use]
    pub fn unsupported_content_type(
        content_type: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.into(),
            locator: locator.into(),
        }
    }

    /// Creates fetch error.
    #[must_use]
    pub fn fetch(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Creates serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationFailed {
            message: message.into(),
        }
    }

    /// Creates deserialization error.
    #[must_use]
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::DeserializationFailed {
            message: message.into(),
        }
    }

    /// Creates file deletion error.
    #[must_use]
    pub fn deletion(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::FileDeletionFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Creates transform error.
    #[must_use]
    pub fn transform(message: impl Into<String>) -> Self {
        Self::TransformFailed {
            message: message.into(),
        }
    }

    /// Creates io error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Returns whether a persisted entry could not be read back.
    #[must_use]
    pub const fn is_deserialization(&self) -> bool {
        matches!(
            self,
            Self::DeserializationFailed { .. } | Self::VersionMismatch { .. }
        )
    }

    /// Returns whether the error happened while obtaining the source bytes.
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::UnsupportedContentType { .. }
        )
    }
}
