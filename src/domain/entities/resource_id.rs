//! Deterministic identifiers for cached resources.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in an identifier (128 bits).
const ID_BYTES: usize = 16;

/// Unique identifier for a cached resource.
///
/// Derived from a hash of the resource's source locator, so every request for
/// the same locator resolves to the same cache key, across processes too.
/// Also used verbatim as the file name of a persisted entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps an already derived identifier (e.g. a persisted file name).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the identifier of a source locator (URL or file path).
    ///
    /// SHA-256 over the UTF-8 bytes, truncated to 128 bits, lowercase hex.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..ID_BYTES]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
