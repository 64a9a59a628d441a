use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{MAX_AMOUNT, round_cents};

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub in_stock: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A price as submitted by a form: either a JSON number or numeric text.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn parse(&self) -> Result<f64, ProductRejection> {
        let value = match self {
            PriceInput::Number(n) => *n,
            PriceInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ProductRejection::InvalidPrice)?,
        };
        if !(value.is_finite() && value > 0.0) {
            return Err(ProductRejection::InvalidPrice);
        }
        if round_cents(value) > MAX_AMOUNT {
            return Err(ProductRejection::PriceTooLarge);
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductRejection {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Price must be a number greater than 0")]
    InvalidPrice,

    #[error("Price must not exceed {max}", max = MAX_AMOUNT)]
    PriceTooLarge,
}

/// Body of `POST /api/products`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

fn required(field: Option<String>) -> Result<String, ProductRejection> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ProductRejection::MissingFields)
}

impl ProductDraft {
    /// Validates the draft and builds a new product. Stock defaults to `true`.
    pub fn into_product(self, id: String, now: NaiveDateTime) -> Result<Product, ProductRejection> {
        let name = required(self.name)?;
        let description = required(self.description)?;
        let image_url = required(self.image_url)?;
        let price = self.price.ok_or(ProductRejection::MissingFields)?.parse()?;

        Ok(Product {
            id,
            name,
            description,
            price,
            image_url,
            in_stock: self.in_stock.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PUT /api/products/{id}`. Absent fields keep their value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<PriceInput>,
    pub image_url: Option<String>,
    pub in_stock: Option<bool>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product, now: NaiveDateTime) -> Result<(), ProductRejection> {
        let price = self.price.as_ref().map(PriceInput::parse).transpose()?;
        let name = self.name.map(|n| required(Some(n))).transpose()?;
        let description = self.description.map(|d| required(Some(d))).transpose()?;
        let image_url = self.image_url.map(|u| required(Some(u))).transpose()?;

        if let Some(name) = name {
            product.name = name;
        }
        if let Some(description) = description {
            product.description = description;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(image_url) = image_url {
            product.image_url = image_url;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        product.updated_at = now;
        Ok(())
    }
}
