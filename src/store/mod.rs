//! # Persistence
//!
//! Repository traits for users, products and orders, with two backends:
//!
//! - MySQL, through the synchronous [`Db`](crate::db::Db) port
//! - [`MemoryStore`], used for database-less development runs and tests
//!
//! Every method blocks. Async callers go through
//! [`tokio::task::spawn_blocking`].

pub mod memory;
pub mod order_repo;
pub mod product_repo;
pub mod seed;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::db::Db;
use crate::model::{Order, OrderStatus, Product, User};

pub use memory::MemoryStore;
pub use order_repo::MySqlOrderRepository;
pub use product_repo::MySqlProductRepository;
pub use user_repo::MySqlUserRepository;

pub trait UserRepository: Send + Sync + 'static {
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fails with a [`DuplicateKeyError`](crate::error::DuplicateKeyError)
    /// in its chain when the email is already registered.
    fn insert(&self, user: &User) -> Result<()>;
}

pub trait ProductRepository: Send + Sync + 'static {
    /// All products, newest first.
    fn list(&self) -> Result<Vec<Product>>;

    fn find(&self, id: &str) -> Result<Option<Product>>;

    fn find_by_name(&self, name: &str) -> Result<Option<Product>>;

    /// Name clashes surface as a
    /// [`DuplicateKeyError`](crate::error::DuplicateKeyError), here and in
    /// [`update`](Self::update).
    fn insert(&self, product: &Product) -> Result<()>;

    /// Overwrites every column of an existing product.
    fn update(&self, product: &Product) -> Result<()>;

    /// Returns `false` when no product had this id.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Which orders a listing covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderScope<'a> {
    All,
    User(&'a str),
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Orders with their items and customer, newest first.
    fn list(&self, scope: OrderScope<'_>) -> Result<Vec<Order>>;

    fn find(&self, id: &str) -> Result<Option<Order>>;

    /// Stores the order and all of its items atomically.
    fn insert(&self, order: &Order) -> Result<()>;

    fn update_status(&self, id: &str, status: OrderStatus, at: NaiveDateTime) -> Result<()>;

    /// Removes the order's items, then the order. Returns `false` when no
    /// order had this id.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// The set of repositories handlers work with.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Store {
    pub fn mysql(db: Arc<dyn Db>) -> Self {
        Self {
            users: Arc::new(MySqlUserRepository::new(db.clone())),
            products: Arc::new(MySqlProductRepository::new(db.clone())),
            orders: Arc::new(MySqlOrderRepository::new(db)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            products: store.clone(),
            orders: store,
        }
    }
}
