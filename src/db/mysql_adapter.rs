//! # MySQL Database Adapter
//!
//! An implementation of the [`Db`] port using the [`mysql`] driver crate.
//!
//! ## Responsibilities
//! - Convert generic [`Param`] values into [`mysql::Value`]
//! - Convert [`mysql::Row`] into a generic [`Row`]
//! - Implement `fetch_one`, `fetch_all`, `exec` and the transactional
//!   `exec_batch` on top of `mysql::Pool`
//!
//! Statements and parameters are logged at `DEBUG` level under the
//! `khanom_shop::db` target. Driver failures are logged at `WARN` with a
//! summary of the server error.
//!
//! ## Testing Policy
//! Unit tests cover the pure conversion functions only. Query execution
//! needs a live server.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql::{Error as MyError, Params, Pool, TxOpts, Value as My, prelude::*};

use crate::db::port::{Db, Param, Row as GRow, Statement, Value};
use crate::error::DuplicateKeyError;

const LOG_TARGET: &str = "khanom_shop::db";

/// Server error code `ER_DUP_ENTRY`.
const ER_DUP_ENTRY: u16 = 1062;

/// Wraps a failed write. Unique key violations become [`DuplicateKeyError`].
fn write_error(e: MyError, what: &'static str) -> anyhow::Error {
    if let MyError::MySqlError(me) = &e {
        if me.code == ER_DUP_ENTRY {
            return DuplicateKeyError::new(duplicate_key_name(&me.message)).into();
        }
    }
    anyhow::Error::new(e).context(what)
}

/// `Duplicate entry 'x' for key 'users.uq_users_email'` → `users.uq_users_email`
fn duplicate_key_name(message: &str) -> &str {
    message
        .rsplit_once(" for key ")
        .map(|(_, key)| key.trim_matches('\''))
        .unwrap_or(message)
}

fn mysql_err_summary(e: &MyError) -> String {
    match e {
        MyError::MySqlError(me) => format!(
            "code={}, state={}, message={}",
            me.code, me.state, me.message
        ),
        MyError::DriverError(de) => format!("driver={de:?}"),
        MyError::UrlError(ue) => format!("url={ue:?}"),
        MyError::IoError(ioe) => format!("io={ioe}"),
        MyError::CodecError(ce) => format!("codec={ce:?}"),
        MyError::FromValueError(fve) => format!("from_value={fve:?}"),
        MyError::FromRowError(fre) => format!("from_row={fre:?}"),
    }
}

fn log_statement(op: &str, sql: &str, params: &[Param<'_>]) {
    tracing::debug!(target: LOG_TARGET, op, sql, params = ?params, "running statement");
}

/// MySQL implementation of the [`Db`] port.
#[derive(Clone)]
pub struct MySqlDb {
    pool: Arc<Pool>,
}

impl MySqlDb {
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool }
    }

    /// Converts a single [`Param`] into a [`mysql::Value`].
    ///
    /// Mapping conventions:
    /// - `Bool(true)` → `Int(1)` / `Bool(false)` → `Int(0)`
    /// - `Str` → `Bytes`
    /// - `DateTime` → `Value::Date` (Y, M, D, H, M, S, μs)
    /// - `Null` → `NULL`
    fn to_mysql_value(p: &Param<'_>) -> My {
        match p {
            Param::I64(x) => My::Int(*x),
            Param::U64(x) => My::UInt(*x),
            Param::F64(x) => My::Double(*x),
            Param::Bool(b) => My::Int(if *b { 1 } else { 0 }),
            Param::Str(s) => My::Bytes(s.as_bytes().to_vec()),
            Param::DateTime(dt) => {
                let d = dt.date();
                let t = dt.time();
                My::Date(
                    d.year() as u16,
                    d.month() as u8,
                    d.day() as u8,
                    t.hour() as u8,
                    t.minute() as u8,
                    t.second() as u8,
                    t.nanosecond() / 1_000,
                )
            }
            Param::Null => My::NULL,
        }
    }

    fn to_mysql_params(params_in: &[Param<'_>]) -> Params {
        let v: Vec<My> = params_in.iter().map(Self::to_mysql_value).collect();
        if v.is_empty() {
            Params::Empty
        } else {
            Params::Positional(v)
        }
    }

    /// Converts a single driver value into a generic [`Value`].
    ///
    /// `DECIMAL` arrives as text and stays a string; [`GRow::get_f64`]
    /// parses it. `TIME` values are stringified.
    fn value_from_mysql(v: My) -> Value {
        match v {
            My::NULL => Value::Null,
            My::Int(i) => Value::I64(i),
            My::UInt(u) => Value::U64(u),
            My::Float(f) => Value::F64(f64::from(f)),
            My::Double(f) => Value::F64(f),
            My::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => Value::Str(s),
                Err(e) => Value::Str(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
            My::Date(y, m, d, hh, mm, ss, micro) => {
                let date = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)
                    .unwrap_or(NaiveDate::MIN);
                let time = NaiveTime::from_hms_micro_opt(hh as u32, mm as u32, ss as u32, micro)
                    .unwrap_or(NaiveTime::MIN);
                Value::DateTime(NaiveDateTime::new(date, time))
            }
            My::Time(neg, days, hh, mm, ss, micro) => {
                let sign = if neg { "-" } else { "" };
                let s = if micro > 0 {
                    format!("{sign}{days:03} {hh:02}:{mm:02}:{ss:02}.{micro:06}")
                } else {
                    format!("{sign}{days:03} {hh:02}:{mm:02}:{ss:02}")
                };
                Value::Str(s)
            }
        }
    }

    fn row_from_mysql(mut r: mysql::Row) -> GRow {
        let names: Vec<String> = r
            .columns_ref()
            .iter()
            .map(|c| c.name_str().to_string())
            .collect();

        let mut out = GRow::default();
        for (idx, name) in names.into_iter().enumerate() {
            let v = r
                .take_opt::<My, _>(idx)
                .unwrap_or(Ok(My::NULL))
                .unwrap_or(My::NULL);
            out.insert(name, Self::value_from_mysql(v));
        }
        out
    }

    fn conn(&self) -> Result<mysql::PooledConn> {
        self.pool.get_conn().context("get_conn failed")
    }
}

impl Db for MySqlDb {
    fn fetch_one(&self, sql: &str, params_in: &[Param<'_>]) -> Result<Option<GRow>> {
        log_statement("fetch_one", sql, params_in);
        let mut conn = self.conn()?;

        let row_opt: Option<mysql::Row> = conn
            .exec_first(sql, Self::to_mysql_params(params_in))
            .inspect_err(|e| {
                tracing::warn!(target: LOG_TARGET, error = %mysql_err_summary(e), "exec_first failed")
            })
            .context("exec_first failed")?;

        Ok(row_opt.map(Self::row_from_mysql))
    }

    fn fetch_all(&self, sql: &str, params_in: &[Param<'_>]) -> Result<Vec<GRow>> {
        log_statement("fetch_all", sql, params_in);
        let mut conn = self.conn()?;

        let rows: Vec<mysql::Row> = conn
            .exec(sql, Self::to_mysql_params(params_in))
            .inspect_err(|e| {
                tracing::warn!(target: LOG_TARGET, error = %mysql_err_summary(e), "exec (fetch_all) failed")
            })
            .context("exec (fetch_all) failed")?;
        tracing::debug!(target: LOG_TARGET, rows = rows.len(), "fetch_all done");

        Ok(rows.into_iter().map(Self::row_from_mysql).collect())
    }

    fn exec(&self, sql: &str, params_in: &[Param<'_>]) -> Result<u64> {
        log_statement("exec", sql, params_in);
        let mut conn = self.conn()?;

        conn.exec_drop(sql, Self::to_mysql_params(params_in))
            .inspect_err(|e| {
                tracing::warn!(target: LOG_TARGET, error = %mysql_err_summary(e), "exec_drop failed")
            })
            .map_err(|e| write_error(e, "exec_drop failed"))?;

        Ok(conn.affected_rows())
    }

    fn exec_batch(&self, statements: &[Statement<'_>]) -> Result<Vec<u64>> {
        let mut conn = self.conn()?;
        let mut tx = conn
            .start_transaction(TxOpts::default())
            .context("start_transaction failed")?;

        let mut affected = Vec::with_capacity(statements.len());
        for st in statements {
            log_statement("exec_batch", st.sql, &st.params);
            // Dropping `tx` on error rolls the transaction back.
            tx.exec_drop(st.sql, Self::to_mysql_params(&st.params))
                .inspect_err(|e| {
                    tracing::warn!(target: LOG_TARGET, error = %mysql_err_summary(e), "batch statement failed")
                })
                .map_err(|e| write_error(e, "exec_batch statement failed"))?;
            affected.push(tx.affected_rows());
        }

        tx.commit().context("commit failed")?;
        Ok(affected)
    }
}
