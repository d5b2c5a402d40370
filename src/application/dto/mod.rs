//! Data transfer objects for the application layer.

mod image_request;
mod request_result;

pub use image_request::ImageRequest;
pub use request_result::RequestResult;
