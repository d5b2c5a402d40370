//! Binary file format for persisted cache entries.
//!
//! One file per entry:
//!
//! ```text
//! u8    version
//! i32   source length (big endian)
//! i32   data length   (big endian)
//! [u8]  source (UTF-8)
//! [u8]  data
//! ```
//!
//! Readers consume exactly the lengths announced by the header and never rely
//! on end-of-file to find the end of a field.

use std::path::Path;

use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{trace, warn};

use crate::domain::entities::{CachedPayload, Resource};
use crate::domain::errors::{CacheError, CacheResult};

/// Current on-disk format version.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: u64 = 1 + 4 + 4;

/// Writes one entry to `writer`.
///
/// # Errors
/// Returns [`CacheError::SerializationFailed`] if a length does not fit the
/// header or the writer fails.
pub async fn write_to<W>(writer: &mut W, resource: &Resource) -> CacheResult<()>
where
    W: AsyncWrite + Unpin,
{
    let source = resource.source().as_bytes();
    let source_len = header_len(source.len(), "source")?;
    let data_len = header_len(resource.len(), "data")?;

    let write = async {
        writer.write_u8(FORMAT_VERSION).await?;
        writer.write_i32(source_len).await?;
        writer.write_i32(data_len).await?;
        writer.write_all(source).await?;
        writer.write_all(resource.data()).await?;
        writer.flush().await
    };
    write
        .await
        .map_err(|e| CacheError::serialization(format!("write failed: {e}")))
}

/// Reads one entry from `reader`.
///
/// `available`, when known, is the number of bytes the reader can still
/// yield; lengths exceeding it are rejected before anything is allocated.
///
/// # Errors
/// Returns [`CacheError::VersionMismatch`] for a foreign version byte and
/// [`CacheError::DeserializationFailed`] for truncated or malformed input.
pub async fn read_from<R>(reader: &mut R, available: Option<u64>) -> CacheResult<Resource>
where
    R: AsyncRead + Unpin,
{
    let version = reader.read_u8().await.map_err(read_error)?;
    if version != FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let source_len = body_len(reader.read_i32().await.map_err(read_error)?, "source")?;
    let data_len = body_len(reader.read_i32().await.map_err(read_error)?, "data")?;

    if let Some(available) = available {
        let needed = HEADER_LEN + source_len as u64 + data_len as u64;
        if needed > available {
            return Err(CacheError::deserialization(format!(
                "truncated entry: header announces {needed} bytes, only {available} present"
            )));
        }
    }

    let mut source = vec![0u8; source_len];
    reader.read_exact(&mut source).await.map_err(read_error)?;
    let source = String::from_utf8(source)
        .map_err(|e| CacheError::deserialization(format!("source is not UTF-8: {e}")))?;

    let mut data = vec![0u8; data_len];
    reader.read_exact(&mut data).await.map_err(read_error)?;

    Ok(Resource::new(source, data))
}

/// Serializes `resource` to `path`, replacing any previous file.
///
/// A partially written file is removed again on failure.
///
/// # Errors
/// Returns [`CacheError::SerializationFailed`] if the file cannot be written.
pub async fn write_entry(path: &Path, resource: &Resource) -> CacheResult<()> {
    let file = fs::File::create(path).await.map_err(|e| {
        CacheError::serialization(format!("failed to create {}: {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);

    if let Err(e) = write_to(&mut writer, resource).await {
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "Failed to remove partial cache file");
        }
        return Err(e);
    }

    trace!(path = %path.display(), size = resource.len(), "Wrote cache file");
    Ok(())
}

/// Deserializes the entry stored at `path`.
///
/// Returns `Ok(None)` if the file does not exist, so a missing file stays
/// distinguishable from a corrupt one.
///
/// # Errors
/// Returns a deserialization error if the file exists but cannot be decoded.
pub async fn read_entry(path: &Path) -> CacheResult<Option<Resource>> {
    let file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CacheError::deserialization(format!(
                "failed to open {}: {e}",
                path.display()
            )));
        }
    };

    let available = file.metadata().await.ok().map(|meta| meta.len());
    let mut reader = BufReader::new(file);
    read_from(&mut reader, available).await.map(Some)
}

/// Produces the uniform decoded view of a backend payload.
///
/// # Errors
/// Returns a deserialization error if a backing file is missing or corrupt.
pub async fn resolve_payload(payload: CachedPayload) -> CacheResult<Resource> {
    match payload {
        CachedPayload::Bytes(resource) => Ok(resource),
        CachedPayload::File(path) => read_entry(&path).await?.ok_or_else(|| {
            CacheError::deserialization(format!("{} no longer exists", path.display()))
        }),
    }
}

fn header_len(len: usize, field: &str) -> CacheResult<i32> {
    i32::try_from(len).map_err(|_| {
        CacheError::serialization(format!("{field} length {len} exceeds the format limit"))
    })
}

fn body_len(len: i32, field: &str) -> CacheResult<usize> {
    usize::try_from(len)
        .map_err(|_| CacheError::deserialization(format!("negative {field} length {len}")))
}

fn read_error(e: std::io::Error) -> CacheError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        CacheError::deserialization("truncated entry")
    } else {
        CacheError::deserialization(format!("read failed: {e}"))
    }
}
