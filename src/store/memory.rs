//! In-process implementation of every repository.
//!
//! Mirrors the MySQL backend's observable behaviour: unique emails and
//! product names, newest-first listings, item product names resolved against
//! the current catalog.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDateTime;

use crate::error::DuplicateKeyError;
use crate::model::{Order, OrderCustomer, OrderStatus, Product, User};
use crate::store::{OrderRepository, OrderScope, ProductRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
    orders: Vec<Order>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl Tables {
    /// Fills in the joined columns the SQL backend would return.
    fn hydrate(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.user = self
            .users
            .iter()
            .find(|u| u.id == order.user_id)
            .map(|u| OrderCustomer {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone(),
            });
        for item in &mut order.order_items {
            item.product_name = self
                .products
                .iter()
                .find(|p| p.id == item.product_id)
                .map(|p| p.name.clone());
        }
        order
    }
}

impl UserRepository for MemoryStore {
    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.email == email).cloned())
    }

    fn insert(&self, user: &User) -> Result<()> {
        let mut t = self.write()?;
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(DuplicateKeyError::new("users.email").into());
        }
        t.users.push(user.clone());
        Ok(())
    }
}

impl ProductRepository for MemoryStore {
    fn list(&self) -> Result<Vec<Product>> {
        let mut products = self.read()?.products.clone();
        products.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(products)
    }

    fn find(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.read()?.products.iter().find(|p| p.id == id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>> {
        Ok(self.read()?.products.iter().find(|p| p.name == name).cloned())
    }

    fn insert(&self, product: &Product) -> Result<()> {
        let mut t = self.write()?;
        if t.products.iter().any(|p| p.name == product.name) {
            return Err(DuplicateKeyError::new("products.name").into());
        }
        t.products.push(product.clone());
        Ok(())
    }

    fn update(&self, product: &Product) -> Result<()> {
        let mut t = self.write()?;
        if t
            .products
            .iter()
            .any(|p| p.name == product.name && p.id != product.id)
        {
            return Err(DuplicateKeyError::new("products.name").into());
        }
        if let Some(slot) = t.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut t = self.write()?;
        let before = t.products.len();
        t.products.retain(|p| p.id != id);
        Ok(t.products.len() != before)
    }
}

impl OrderRepository for MemoryStore {
    fn list(&self, scope: OrderScope<'_>) -> Result<Vec<Order>> {
        let t = self.read()?;
        let mut orders: Vec<Order> = t
            .orders
            .iter()
            .filter(|o| match scope {
                OrderScope::All => true,
                OrderScope::User(user_id) => o.user_id == user_id,
            })
            .map(|o| t.hydrate(o))
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    fn find(&self, id: &str) -> Result<Option<Order>> {
        let t = self.read()?;
        Ok(t.orders.iter().find(|o| o.id == id).map(|o| t.hydrate(o)))
    }

    fn insert(&self, order: &Order) -> Result<()> {
        let mut t = self.write()?;
        if t.orders.iter().any(|o| o.id == order.id) {
            bail!("duplicate order id `{}`", order.id);
        }
        t.orders.push(order.clone());
        Ok(())
    }

    fn update_status(&self, id: &str, status: OrderStatus, at: NaiveDateTime) -> Result<()> {
        let mut t = self.write()?;
        if let Some(order) = t.orders.iter_mut().find(|o| o.id == id) {
            order.status = status;
            order.updated_at = at;
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut t = self.write()?;
        let before = t.orders.len();
        t.orders.retain(|o| o.id != id);
        Ok(t.orders.len() != before)
    }
}
