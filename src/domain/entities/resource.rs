//! Cached resource payloads.

use std::path::{Path, PathBuf};

use bytes::Bytes;

/// A loaded resource: its source locator and raw bytes.
///
/// Cloning is cheap, the bytes are reference counted.
#[derive(Clone, PartialEq, Eq)]
pub struct Resource {
    source: String,
    data: Bytes,
}

impl Resource {
    /// Creates a resource from its source locator and raw bytes.
    #[must_use]
    pub fn new(source: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            source: source.into(),
            data: data.into(),
        }
    }

    /// The locator the bytes were loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The raw bytes.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a copy carrying the same source and different bytes.
    #[must_use]
    pub fn with_data(&self, data: impl Into<Bytes>) -> Self {
        Self::new(self.source.clone(), data)
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("source", &self.source)
            .field("len", &self.data.len())
            .finish()
    }
}

/// What a backend holds for one entry.
///
/// The memory backend keeps bytes, the disk backend keeps a path to the
/// persisted file. `infrastructure::cache::persistence::resolve_payload`
/// turns either into a [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPayload {
    /// Bytes held in process memory.
    Bytes(Resource),
    /// Entry persisted to a file.
    File(PathBuf),
}

impl CachedPayload {
    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Bytes(_) => None,
            Self::File(path) => Some(path),
        }
    }
}
