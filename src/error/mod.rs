pub mod api;
pub mod entity;

pub use api::ApiError;
pub use entity::{DuplicateKeyError, NotFoundError, OrNotFound, is_duplicate_key};
