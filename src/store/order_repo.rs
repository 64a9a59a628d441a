use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::db::{Db, Param, Row, Statement};
use crate::model::{Order, OrderCustomer, OrderItem, OrderStatus, db_timestamp};
use crate::params;
use crate::store::{OrderRepository, OrderScope};

const SELECT_ORDER: &str = "SELECT o.id, o.user_id, o.status, o.total_amount, o.created_at, \
     o.updated_at, u.name AS user_name, u.email AS user_email \
     FROM orders o LEFT JOIN users u ON u.id = o.user_id";

const SELECT_ITEM: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price, \
     p.name AS product_name \
     FROM order_items oi JOIN orders o ON o.id = oi.order_id \
     LEFT JOIN products p ON p.id = oi.product_id";

const ORDER_NEWEST_FIRST: &str = "ORDER BY o.created_at DESC, o.id DESC";

pub struct MySqlOrderRepository {
    db: Arc<dyn Db>,
}

impl MySqlOrderRepository {
    pub fn new(db: Arc<dyn Db>) -> Self {
        Self { db }
    }

    /// Loads orders and their items with one query each, sharing `filter`.
    fn load(&self, filter: &str, params: &[Param<'_>]) -> Result<Vec<Order>> {
        let order_sql = format!("{SELECT_ORDER} {filter} {ORDER_NEWEST_FIRST}");
        let item_sql = format!("{SELECT_ITEM} {filter} ORDER BY oi.id");

        let mut orders = self
            .db
            .fetch_all(&order_sql, params)?
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>>>()?;

        let mut items: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for row in self.db.fetch_all(&item_sql, params)? {
            let item = item_from_row(&row)?;
            items.entry(item.order_id.clone()).or_default().push(item);
        }

        for order in &mut orders {
            order.order_items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }
}

fn order_from_row(row: &Row) -> Result<Order> {
    let id = row.get_string("id")?;
    let user_id = row.get_string("user_id")?;
    let status: OrderStatus = row.get_string("status")?.parse()?;
    let user = match (row.get_string_opt("user_name")?, row.get_string_opt("user_email")?) {
        (Some(name), Some(email)) => Some(OrderCustomer {
            id: user_id.clone(),
            name,
            email,
        }),
        _ => None,
    };

    Ok(Order {
        id,
        user_id,
        status,
        total_amount: row.get_f64("total_amount")?,
        created_at: row.get_datetime("created_at")?,
        updated_at: row.get_datetime("updated_at")?,
        user,
        order_items: Vec::new(),
    })
}

fn item_from_row(row: &Row) -> Result<OrderItem> {
    let quantity = u32::try_from(row.get_u64("quantity")?).context("quantity out of range")?;
    Ok(OrderItem {
        id: row.get_string("id")?,
        order_id: row.get_string("order_id")?,
        product_id: row.get_string("product_id")?,
        quantity,
        price: row.get_f64("price")?,
        product_name: row.get_string_opt("product_name")?,
    })
}

impl OrderRepository for MySqlOrderRepository {
    fn list(&self, scope: OrderScope<'_>) -> Result<Vec<Order>> {
        let orders = match scope {
            OrderScope::All => self.load("", &[]),
            OrderScope::User(user_id) => self.load("WHERE o.user_id = ?", &params![user_id]),
        };
        orders.context("orders.list")
    }

    fn find(&self, id: &str) -> Result<Option<Order>> {
        let mut found = self
            .load("WHERE o.id = ?", &params![id])
            .context("orders.find")?;
        Ok(found.pop())
    }

    fn insert(&self, order: &Order) -> Result<()> {
        let mut statements = Vec::with_capacity(order.order_items.len() + 1);
        statements.push(Statement::new(
            "INSERT INTO orders (id, user_id, status, total_amount, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                &order.id,
                &order.user_id,
                order.status.as_str(),
                order.total_amount,
                db_timestamp(order.created_at),
                db_timestamp(order.updated_at)
            ],
        ));
        for item in &order.order_items {
            statements.push(Statement::new(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price) \
                 VALUES (?, ?, ?, ?, ?)",
                params![&item.id, &item.order_id, &item.product_id, item.quantity, item.price],
            ));
        }

        self.db.exec_batch(&statements).context("orders.insert")?;
        Ok(())
    }

    fn update_status(&self, id: &str, status: OrderStatus, at: NaiveDateTime) -> Result<()> {
        self.db
            .exec(
                "UPDATE orders SET status = ?, updated_at = ? WHERE id = ?",
                &params![status.as_str(), db_timestamp(at), id],
            )
            .context("orders.update_status")?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let affected = self
            .db
            .exec_batch(&[
                Statement::new("DELETE FROM order_items WHERE order_id = ?", params![id]),
                Statement::new("DELETE FROM orders WHERE id = ?", params![id]),
            ])
            .context("orders.delete")?;
        Ok(affected.last().copied().unwrap_or(0) > 0)
    }
}
