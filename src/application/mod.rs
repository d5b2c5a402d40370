//! Application layer with request execution services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Cache façade, request engine and transform pipeline.
pub mod services;

pub use dto::{ImageRequest, RequestResult};
pub use services::{ImageCache, RequestEngine, TransformPipeline};
