//! Domain entity definitions.

mod media_type;
mod request_state;
mod resource;
mod resource_id;

pub use media_type::MediaType;
pub use request_state::{RequestState, StoreStrategy};
pub use resource::{CachedPayload, Resource};
pub use resource_id::ResourceId;
