//! Application services.

mod image_cache;
mod request_engine;
mod transform_pipeline;

pub use image_cache::ImageCache;
pub use request_engine::RequestEngine;
pub use transform_pipeline::TransformPipeline;
