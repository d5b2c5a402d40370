//! Port definition for image transforms.

/// A single image operation.
///
/// Transforms are pure: they take a decoded image and return a new one.
/// Decoding and re-encoding happen once per request, around the whole
/// sequence, not around each transform.
#[cfg_attr(test, mockall::automock)]
pub trait Transform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Applies the operation.
    fn apply(&self, image: image::DynamicImage) -> image::DynamicImage;
}
