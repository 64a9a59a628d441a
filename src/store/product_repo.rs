use std::sync::Arc;

use anyhow::{Context, Result};

use crate::db::{Db, Row};
use crate::model::{Product, db_timestamp};
use crate::params;
use crate::store::ProductRepository;

const SELECT_PRODUCT: &str = "SELECT id, name, description, price, image_url, in_stock, \
     created_at, updated_at FROM products";

pub struct MySqlProductRepository {
    db: Arc<dyn Db>,
}

impl MySqlProductRepository {
    pub fn new(db: Arc<dyn Db>) -> Self {
        Self { db }
    }

    fn find_where(&self, clause: &str, value: &str) -> Result<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE {clause} = ?");
        self.db
            .fetch_one(&sql, &params![value])?
            .as_ref()
            .map(product_from_row)
            .transpose()
    }
}

pub(crate) fn product_from_row(row: &Row) -> Result<Product> {
    Ok(Product {
        id: row.get_string("id")?,
        name: row.get_string("name")?,
        description: row.get_string("description")?,
        price: row.get_f64("price")?,
        image_url: row.get_string("image_url")?,
        in_stock: row.get_bool("in_stock")?,
        created_at: row.get_datetime("created_at")?,
        updated_at: row.get_datetime("updated_at")?,
    })
}

impl ProductRepository for MySqlProductRepository {
    fn list(&self) -> Result<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY created_at DESC, id DESC");
        self.db
            .fetch_all(&sql, &[])?
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>>>()
            .context("products.list")
    }

    fn find(&self, id: &str) -> Result<Option<Product>> {
        self.find_where("id", id).context("products.find")
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>> {
        self.find_where("name", name).context("products.find_by_name")
    }

    fn insert(&self, p: &Product) -> Result<()> {
        self.db
            .exec(
                "INSERT INTO products \
                 (id, name, description, price, image_url, in_stock, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                &params![
                    &p.id,
                    &p.name,
                    &p.description,
                    p.price,
                    &p.image_url,
                    p.in_stock,
                    db_timestamp(p.created_at),
                    db_timestamp(p.updated_at)
                ],
            )
            .context("products.insert")?;
        Ok(())
    }

    fn update(&self, p: &Product) -> Result<()> {
        self.db
            .exec(
                "UPDATE products SET name = ?, description = ?, price = ?, image_url = ?, \
                 in_stock = ?, updated_at = ? WHERE id = ?",
                &params![
                    &p.name,
                    &p.description,
                    p.price,
                    &p.image_url,
                    p.in_stock,
                    db_timestamp(p.updated_at),
                    &p.id
                ],
            )
            .context("products.update")?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let n = self
            .db
            .exec("DELETE FROM products WHERE id = ?", &params![id])
            .context("products.delete")?;
        Ok(n > 0)
    }
}
