//! # Database Port (Synchronous)
//!
//! An abstract database interface (`Db`) plus the value types adapters and
//! repositories exchange.
//!
//! - [`Param`]: SQL parameters.
//! - [`Value`] / [`Row`]: owned column data.
//! - [`Statement`]: one SQL statement with its parameters, for batches.
//! - [`Db`]: `fetch_one`, `fetch_all`, `exec`, `exec_batch`.
//!
//! # Example
//! ```rust,ignore
//! use khanom_shop::params;
//!
//! let ps = params!["Mango Sticky Rice", 8.99f64, true];
//! db.exec("INSERT INTO products (name, price, in_stock) VALUES (?, ?, ?)", &ps)?;
//! ```
use std::collections::HashMap;

use anyhow::{Result, bail};
use chrono::NaiveDateTime;

/// SQL parameter types passed to a query.
///
/// - `Str(&str)` holds a borrowed string reference.
/// - `Null` represents an SQL NULL.
/// - `DateTime` uses [`NaiveDateTime`] (UTC by convention).
#[derive(Debug, Clone, PartialEq)]
pub enum Param<'a> {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(&'a str),
    DateTime(NaiveDateTime),
    Null,
}

/// Generic owned database value used for row mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(String),
    DateTime(NaiveDateTime),
    Null,
}

/// A single database row (column name → value map).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cols: HashMap<String, Value>,
}

/// One statement of a transactional batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    pub sql: &'static str,
    pub params: Vec<Param<'a>>,
}

impl<'a> Statement<'a> {
    pub fn new(sql: &'static str, params: Vec<Param<'a>>) -> Self {
        Self { sql, params }
    }
}

// ------------------------------
// Param conversions (From impls)
// ------------------------------

impl<'a> From<i64> for Param<'a> {
    fn from(x: i64) -> Self {
        Param::I64(x)
    }
}

impl<'a> From<u64> for Param<'a> {
    fn from(x: u64) -> Self {
        Param::U64(x)
    }
}

impl<'a> From<u32> for Param<'a> {
    fn from(x: u32) -> Self {
        Param::U64(u64::from(x))
    }
}

impl<'a> From<f64> for Param<'a> {
    fn from(x: f64) -> Self {
        Param::F64(x)
    }
}

impl<'a> From<bool> for Param<'a> {
    fn from(x: bool) -> Self {
        Param::Bool(x)
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(x: &'a str) -> Self {
        Param::Str(x)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(x: &'a String) -> Self {
        Param::Str(x.as_str())
    }
}

impl<'a> From<Option<&'a str>> for Param<'a> {
    fn from(x: Option<&'a str>) -> Self {
        match x {
            Some(s) => Param::Str(s),
            None => Param::Null,
        }
    }
}

impl<'a> From<NaiveDateTime> for Param<'a> {
    fn from(x: NaiveDateTime) -> Self {
        Param::DateTime(x)
    }
}

// ------------------------------------
// params! macro
// ------------------------------------

/// Builds a `Vec<Param>` for SQL queries.
///
/// ```rust
/// use khanom_shop::db::port::Param;
/// use khanom_shop::params;
///
/// let note: Option<&str> = None;
/// let ps = params![42u64, "Alice", true, note];
/// assert!(matches!(ps[0], Param::U64(42)));
/// assert!(matches!(ps[3], Param::Null));
/// ```
#[macro_export]
macro_rules! params {
    ($($x:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut v = Vec::<$crate::db::port::Param>::new();
        $( v.push($crate::db::port::Param::from($x)); )*
        v
    }};
}

// ------------------------------
// Row helper methods
// ------------------------------

impl Row {
    /// Inserts a new column (used by DB adapters and test fakes).
    pub fn insert(&mut self, key: impl Into<String>, val: Value) {
        self.cols.insert(key.into(), val);
    }

    /// Builder-style [`Row::insert`].
    pub fn with(mut self, key: impl Into<String>, val: Value) -> Self {
        self.insert(key, val);
        self
    }

    /// Returns a `u64` (accepts non-negative `i64`).
    pub fn get_u64(&self, key: &str) -> Result<u64> {
        match self.cols.get(key) {
            Some(Value::U64(v)) => Ok(*v),
            Some(Value::I64(v)) if *v >= 0 => Ok(*v as u64),
            _ => bail!("column `{key}` is not U64"),
        }
    }

    /// Returns an `i64`.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        match self.cols.get(key) {
            Some(Value::I64(v)) => Ok(*v),
            Some(Value::U64(v)) if *v <= i64::MAX as u64 => Ok(*v as i64),
            _ => bail!("column `{key}` is not I64"),
        }
    }

    /// Returns an `f64`.
    ///
    /// Integers and numeric strings are accepted, since `DECIMAL` columns
    /// arrive from the driver as text.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        match self.cols.get(key) {
            Some(Value::F64(v)) => Ok(*v),
            Some(Value::I64(v)) => Ok(*v as f64),
            Some(Value::U64(v)) => Ok(*v as f64),
            Some(Value::Str(s)) => match s.trim().parse::<f64>() {
                Ok(v) => Ok(v),
                Err(_) => bail!("column `{key}` is not F64"),
            },
            _ => bail!("column `{key}` is not F64"),
        }
    }

    /// Returns a `bool`.
    ///
    /// Accepts:
    /// - `Bool` directly
    /// - Numeric values (`I64`, `U64`) where non-zero = `true`
    /// - Strings `"0"` or `"1"`
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.cols.get(key) {
            Some(Value::Bool(v)) => Ok(*v),
            Some(Value::I64(v)) => Ok(*v != 0),
            Some(Value::U64(v)) => Ok(*v != 0),
            Some(Value::Str(s)) if s == "0" || s == "1" => Ok(s != "0"),
            _ => bail!("column `{key}` is not Bool"),
        }
    }

    /// Returns a `String` (only for `Value::Str`).
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.cols.get(key) {
            Some(Value::Str(s)) => Ok(s.clone()),
            _ => bail!("column `{key}` is not String"),
        }
    }

    /// Returns a [`NaiveDateTime`].
    pub fn get_datetime(&self, key: &str) -> Result<NaiveDateTime> {
        match self.cols.get(key) {
            Some(Value::DateTime(dt)) => Ok(*dt),
            _ => bail!("column `{key}` is not DateTime"),
        }
    }

    /// Returns an optional `String` (`NULL` → `None`).
    pub fn get_string_opt(&self, key: &str) -> Result<Option<String>> {
        match self.cols.get(key) {
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(Value::Null) => Ok(None),
            Some(_) => bail!("column `{key}` is not String/NULL"),
            None => bail!("column `{key}` not found"),
        }
    }
}

/// Database abstraction (synchronous).
///
/// Callers on an async runtime run these methods on the blocking pool.
pub trait Db: Send + Sync + 'static {
    fn fetch_one(&self, sql: &str, params: &[Param<'_>]) -> Result<Option<Row>>;

    fn fetch_all(&self, sql: &str, params: &[Param<'_>]) -> Result<Vec<Row>>;

    /// Execute a write operation (`INSERT`, `UPDATE`, `DELETE`).
    ///
    /// Returns affected row count.
    fn exec(&self, sql: &str, params: &[Param<'_>]) -> Result<u64>;

    /// Execute every statement inside one transaction.
    ///
    /// Either all statements commit or none do. Returns the affected row
    /// count of each statement, in order.
    fn exec_batch(&self, statements: &[Statement<'_>]) -> Result<Vec<u64>>;
}
