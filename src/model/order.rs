use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{MAX_AMOUNT, Product, new_id, round_cents};

/// Fulfilment state of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// The customer an order belongs to, as shown in order listings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderCustomer {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One purchased product line. `price` is the unit price at purchase time.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
    /// `None` once the product has been removed from the catalog.
    pub product_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user: Option<OrderCustomer>,
    pub order_items: Vec<OrderItem>,
}

/// One cart line submitted by the client.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Largest quantity accepted on a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error("Order must contain at least one item")]
    Empty,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Quantity must not exceed {max}", max = MAX_LINE_QUANTITY)]
    QuantityTooLarge,

    #[error("Order total must not exceed {max}", max = MAX_AMOUNT)]
    TotalTooLarge,

    #[error("Product {0} not found")]
    UnknownProduct(String),

    #[error("{0} is out of stock")]
    OutOfStock(String),
}

impl Order {
    /// Builds a pending order from cart lines.
    ///
    /// Unit prices and the total come from `catalog`, never from the client.
    pub fn place(
        user_id: &str,
        lines: &[OrderLine],
        catalog: &[Product],
        now: NaiveDateTime,
    ) -> Result<Order, OrderRejection> {
        if lines.is_empty() {
            return Err(OrderRejection::Empty);
        }

        let order_id = new_id();
        let mut items = Vec::with_capacity(lines.len());
        let mut total = 0.0;

        for line in lines {
            if line.quantity < 1 {
                return Err(OrderRejection::InvalidQuantity);
            }
            let quantity = u32::try_from(line.quantity)
                .ok()
                .filter(|q| *q <= MAX_LINE_QUANTITY)
                .ok_or(OrderRejection::QuantityTooLarge)?;
            let product = catalog
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| OrderRejection::UnknownProduct(line.product_id.clone()))?;
            if !product.in_stock {
                return Err(OrderRejection::OutOfStock(product.name.clone()));
            }

            total += product.price * f64::from(quantity);
            items.push(OrderItem {
                id: new_id(),
                order_id: order_id.clone(),
                product_id: product.id.clone(),
                quantity,
                price: product.price,
                product_name: Some(product.name.clone()),
            });
        }

        let total = round_cents(total);
        if total > MAX_AMOUNT {
            return Err(OrderRejection::TotalTooLarge);
        }

        Ok(Order {
            id: order_id,
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            total_amount: total,
            created_at: now,
            updated_at: now,
            user: None,
            order_items: items,
        })
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
