//! # Database Configuration and Pool Factory
//!
//! Connection settings (`DATABASE_URL`, `DATABASE_MAX_CONN`) and a helper to
//! build the shared MySQL pool.

use std::sync::Arc;

use anyhow::Context;
use mysql::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};

use crate::config::env::read_string_from;

/// Database connection configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

impl DbConfig {
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            url: read_string_from(&get, "DATABASE_URL"),
            max_connections: get("DATABASE_MAX_CONN").and_then(|s| s.trim().parse::<u32>().ok()),
        }
    }

    /// Returns `true` if `DATABASE_URL` is present.
    pub fn is_valid(&self) -> bool {
        self.url.is_some()
    }
}

/// Shared database pool type alias.
pub type DbPool = Arc<Pool>;

/// Creates a [`DbPool`] from the configuration.
///
/// # Errors
/// - `DATABASE_URL` is missing
/// - the URL is invalid
/// - the pool cannot be created
pub fn create_pool(cfg: &DbConfig) -> anyhow::Result<DbPool> {
    let url = cfg
        .url
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let opts = Opts::from_url(url).context("invalid DATABASE_URL")?;

    let opts = match cfg.max_connections.map(|n| n as usize) {
        Some(0) => anyhow::bail!("DATABASE_MAX_CONN must be at least 1"),
        Some(max) => {
            let constraints = PoolConstraints::new(1, max)
                .ok_or_else(|| anyhow::anyhow!("invalid DATABASE_MAX_CONN: {max}"))?;
            OptsBuilder::from_opts(opts)
                .pool_opts(PoolOpts::default().with_constraints(constraints))
                .into()
        }
        None => opts,
    };

    let pool = Pool::new(opts).context("failed to create MySQL pool")?;
    Ok(Arc::new(pool))
}
