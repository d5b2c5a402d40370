//! Image transform library.

pub mod image_ops;

pub use image_ops::{
    Brightness, CenterCrop, Contrast, Fit, Flip, GaussianBlur, Grayscale, Resize, Rotate,
};
