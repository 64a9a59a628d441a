//! JSON API under `/api`.
//!
//! Access control is the gate's job. Handlers only re-check what the route
//! table cannot express, such as order ownership.

pub mod admin_orders;
pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::app::AppState;
use crate::web::csrf::csrf_handler;

/// `{"message": ...}` success body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/csrf", get(csrf_handler))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/admin/orders", get(admin_orders::list))
        .route(
            "/api/admin/orders/{id}",
            get(admin_orders::show)
                .patch(admin_orders::update_status)
                .delete(admin_orders::remove),
        )
}
