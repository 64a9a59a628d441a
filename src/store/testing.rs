//! Test doubles: a recording fake of the [`Db`] port for repository tests,
//! and a store whose uniqueness lookups miss so handlers meet the
//! repository's duplicate-key error instead.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::db::{Db, Param, Row, Statement};
use crate::model::{Product, User};
use crate::store::{MemoryStore, ProductRepository, UserRepository};

/// One statement seen by [`RecordingDb`], with its parameters rendered via
/// `Debug` so they outlive the borrowed originals.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<String>,
}

/// Records every statement and answers reads from a queue of canned results.
#[derive(Default)]
pub struct RecordingDb {
    calls: Mutex<Vec<Call>>,
    results: Mutex<VecDeque<Vec<Row>>>,
    affected: Mutex<VecDeque<u64>>,
}

impl RecordingDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the rows returned by the next `fetch_one` / `fetch_all`.
    pub fn push_rows(self, rows: Vec<Row>) -> Self {
        self.results.lock().unwrap().push_back(rows);
        self
    }

    /// Queues the affected-row count returned by the next write.
    pub fn push_affected(self, n: u64) -> Self {
        self.affected.lock().unwrap().push_back(n);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[Param<'_>]) {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.iter().map(|p| format!("{p:?}")).collect(),
        });
    }

    fn next_rows(&self) -> Vec<Row> {
        self.results.lock().unwrap().pop_front().unwrap_or_default()
    }

    fn next_affected(&self) -> u64 {
        self.affected.lock().unwrap().pop_front().unwrap_or(1)
    }
}

impl Db for RecordingDb {
    fn fetch_one(&self, sql: &str, params: &[Param<'_>]) -> Result<Option<Row>> {
        self.record(sql, params);
        Ok(self.next_rows().into_iter().next())
    }

    fn fetch_all(&self, sql: &str, params: &[Param<'_>]) -> Result<Vec<Row>> {
        self.record(sql, params);
        Ok(self.next_rows())
    }

    fn exec(&self, sql: &str, params: &[Param<'_>]) -> Result<u64> {
        self.record(sql, params);
        Ok(self.next_affected())
    }

    fn exec_batch(&self, statements: &[Statement<'_>]) -> Result<Vec<u64>> {
        Ok(statements
            .iter()
            .map(|st| {
                self.record(st.sql, &st.params);
                self.next_affected()
            })
            .collect())
    }
}

/// Answers `find_by_email` and `find_by_name` with `None`, as if a concurrent
/// insert landed between the lookup and the write. Everything else goes to
/// the wrapped store, which still enforces uniqueness on insert.
pub struct StaleLookups(pub Arc<MemoryStore>);

impl UserRepository for StaleLookups {
    fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        Ok(None)
    }

    fn insert(&self, user: &User) -> Result<()> {
        UserRepository::insert(&*self.0, user)
    }
}

impl ProductRepository for StaleLookups {
    fn list(&self) -> Result<Vec<Product>> {
        ProductRepository::list(&*self.0)
    }

    fn find(&self, id: &str) -> Result<Option<Product>> {
        ProductRepository::find(&*self.0, id)
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<Product>> {
        Ok(None)
    }

    fn insert(&self, product: &Product) -> Result<()> {
        ProductRepository::insert(&*self.0, product)
    }

    fn update(&self, product: &Product) -> Result<()> {
        ProductRepository::update(&*self.0, product)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        ProductRepository::delete(&*self.0, id)
    }
}
