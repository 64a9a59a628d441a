//! Storefront domain types.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderCustomer, OrderItem, OrderLine, OrderRejection, OrderStatus, UnknownStatus};
pub use product::{PriceInput, Product, ProductDraft, ProductPatch, ProductRejection};
pub use user::User;

use chrono::{NaiveDateTime, Timelike};

/// Largest amount a `DECIMAL(10, 2)` money column holds.
pub const MAX_AMOUNT: f64 = 99_999_999.99;

pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Generates a new time-ordered identifier.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Truncates to whole seconds so values survive a `DATETIME` column intact.
pub fn db_timestamp(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}
