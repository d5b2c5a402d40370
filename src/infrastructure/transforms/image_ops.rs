//! Concrete image transforms built on the `image` crate.

use image::DynamicImage;
use image::imageops::FilterType;

use crate::domain::ports::Transform;

/// Resizes to exact dimensions, ignoring the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    width: u32,
    height: u32,
}

impl Resize {
    /// Creates a resize to `width` x `height`.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Transform for Resize {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.resize_exact(self.width, self.height, FilterType::Lanczos3)
    }
}

/// Scales down (or up) to fit within a bounding box, keeping the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    max_width: u32,
    max_height: u32,
}

impl Fit {
    /// Creates a fit into `max_width` x `max_height`.
    #[must_use]
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

impl Transform for Fit {
    fn name(&self) -> &'static str {
        "fit"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.resize(self.max_width, self.max_height, FilterType::Lanczos3)
    }
}

/// Crops a centered region. Dimensions larger than the image are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterCrop {
    width: u32,
    height: u32,
}

impl CenterCrop {
    /// Creates a centered crop of `width` x `height`.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Transform for CenterCrop {
    fn name(&self) -> &'static str {
        "center_crop"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        let width = self.width.min(image.width());
        let height = self.height.min(image.height());
        let x = (image.width() - width) / 2;
        let y = (image.height() - height) / 2;
        image.crop_imm(x, y, width, height)
    }
}

/// Converts to grayscale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grayscale;

impl Transform for Grayscale {
    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.grayscale()
    }
}

/// Gaussian blur with the given standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlur {
    sigma: f32,
}

impl GaussianBlur {
    /// Creates a blur with standard deviation `sigma`.
    #[must_use]
    pub const fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl Transform for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.blur(self.sigma)
    }
}

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotate {
    /// 90 degrees clockwise.
    Quarter,
    /// 180 degrees.
    Half,
    /// 270 degrees clockwise.
    ThreeQuarters,
}

impl Rotate {
    /// Maps a clockwise angle in degrees to a rotation.
    ///
    /// Returns `None` for angles that are not a non-zero multiple of 90.
    #[must_use]
    pub const fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            90 => Some(Self::Quarter),
            180 => Some(Self::Half),
            270 => Some(Self::ThreeQuarters),
            _ => None,
        }
    }
}

impl Transform for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Quarter => image.rotate90(),
            Self::Half => image.rotate180(),
            Self::ThreeQuarters => image.rotate270(),
        }
    }
}

/// Mirror along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Transform for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Horizontal => image.fliph(),
            Self::Vertical => image.flipv(),
        }
    }
}

/// Adds `value` to every channel; negative values darken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    value: i32,
}

impl Brightness {
    /// Creates a brightness adjustment.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self { value }
    }
}

impl Transform for Brightness {
    fn name(&self) -> &'static str {
        "brightness"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.brighten(self.value)
    }
}

/// Contrast adjustment; positive values increase contrast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contrast {
    amount: f32,
}

impl Contrast {
    /// Creates a contrast adjustment.
    #[must_use]
    pub const fn new(amount: f32) -> Self {
        Self { amount }
    }
}

impl Transform for Contrast {
    fn name(&self) -> &'static str {
        "contrast"
    }

    fn apply(&self, image: DynamicImage) -> DynamicImage {
        image.adjust_contrast(self.amount)
    }
}
