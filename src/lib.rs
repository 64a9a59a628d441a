//! # khanom_shop
//!
//! Backend for a Thai dessert storefront: product catalog, cart checkout,
//! customer orders and an admin area, served as a JSON API plus an HTML
//! page shell.
//!
//! Every request passes the authorization [`gate`] first. It classifies the
//! route as public, protected or admin-only, verifies the JWT credential
//! carried by the `auth-token` cookie or a bearer header, checks the role,
//! and either forwards the request with the caller's identity attached or
//! answers with a JSON 401/403 (API) or a login redirect (pages).
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use khanom_shop::app::{AppState, build_router};
//! use khanom_shop::config::AppConfig;
//! use khanom_shop::store::{MemoryStore, Store};
//! use khanom_shop::time::SystemClock;
//! use khanom_shop::web::spa::PageShell;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::from_env()?;
//! let state = AppState::new(
//!     &config,
//!     Store::memory(MemoryStore::new()),
//!     Arc::new(SystemClock),
//!     PageShell::default(),
//! );
//! let app = build_router(state, &config)?;
//! let listener = tokio::net::TcpListener::bind(&config.http.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

// ===============================
// Re-exports of external crates
// ===============================

pub use anyhow;
pub use axum;
pub use chrono;

// ===============================
// Public modules
// ===============================
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod model;
pub mod store;
pub mod time;
pub mod web;
