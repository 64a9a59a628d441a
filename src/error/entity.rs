use thiserror::Error;

/// A requested entity does not exist.
///
/// Repositories report absence as `Option`; handlers turn a `None` into this
/// error, which maps onto a JSON 404.
///
/// # Example
/// ```
/// use khanom_shop::error::entity::NotFoundError;
///
/// let err = NotFoundError::new("Product");
/// assert_eq!(err.to_string(), "Product not found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{entity} not found")]
pub struct NotFoundError {
    /// Name of the missing entity (e.g. `"Product"`, `"Order"`)
    pub entity: &'static str,
}

impl NotFoundError {
    pub fn new(entity: &'static str) -> Self {
        Self { entity }
    }
}

/// Turns an optional lookup result into a [`NotFoundError`].
pub trait OrNotFound<T> {
    fn or_not_found(self, entity: &'static str) -> Result<T, NotFoundError>;
}

impl<T> OrNotFound<T> for Option<T> {
    fn or_not_found(self, entity: &'static str) -> Result<T, NotFoundError> {
        self.ok_or(NotFoundError::new(entity))
    }
}

/// A write collided with a unique key (email, product name).
///
/// Repositories return it inside their `anyhow::Error` so handlers can tell
/// a lost insert race from a real failure with [`is_duplicate_key`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate entry for unique key `{key}`")]
pub struct DuplicateKeyError {
    pub key: String,
}

impl DuplicateKeyError {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// `true` when `err` or any of its causes is a [`DuplicateKeyError`].
pub fn is_duplicate_key(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<DuplicateKeyError>())
}
