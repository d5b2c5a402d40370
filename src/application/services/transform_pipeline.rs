//! Decode once, transform, encode once.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::ImageFormat;
use tracing::trace;

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::Transform;

/// Ordered sequence of transforms applied to encoded image bytes.
#[derive(Clone)]
pub struct TransformPipeline {
    transforms: Vec<Arc<dyn Transform>>,
    format: ImageFormat,
}

impl TransformPipeline {
    /// Creates a pipeline encoding its output as `format`.
    #[must_use]
    pub fn new(transforms: Vec<Arc<dyn Transform>>, format: ImageFormat) -> Self {
        Self { transforms, format }
    }

    /// Returns true if the pipeline leaves its input untouched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Runs every transform over `data`.
    ///
    /// An empty pipeline returns `data` as is, without decoding it. Otherwise
    /// the bytes are decoded once, passed through each transform in order and
    /// encoded once. The work runs on the blocking pool.
    ///
    /// # Errors
    /// Returns [`CacheError::TransformFailed`] if decoding or encoding fails.
    pub async fn run(&self, data: Bytes) -> CacheResult<Bytes> {
        if self.is_empty() {
            return Ok(data);
        }

        let transforms = self.transforms.clone();
        let format = self.format;
        tokio::task::spawn_blocking(move || -> CacheResult<Bytes> {
            let mut img = image::load_from_memory(&data)
                .map_err(|e| CacheError::transform(format!("Failed to decode image: {e}")))?;

            for transform in &transforms {
                trace!(transform = transform.name(), "Applying transform");
                img = transform.apply(img);
            }

            let mut encoded = Vec::new();
            img.write_to(&mut Cursor::new(&mut encoded), format)
                .map_err(|e| CacheError::transform(format!("Failed to encode image: {e}")))?;
            Ok(Bytes::from(encoded))
        })
        .await
        .map_err(|e| CacheError::transform(format!("Transform task panicked: {e}")))?
    }
}

impl std::fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("TransformPipeline")
            .field("transforms", &names)
            .field("format", &self.format)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    /// Encodes a solid `width` x `height` PNG.
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 20, 30, 255]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }
}
