//! HTML page routes served by the page shell.

pub mod entry;

use axum::{Router, routing::get};

use crate::app::AppState;

pub use entry::{PageShell, PageState, page_handler};

/// Paths rendered by the frontend. Each `{*rest}` entry also covers nested
/// pages such as `/orders/{id}`.
pub const PAGE_ROUTES: &[&str] = &[
    "/",
    "/products",
    "/products/{*rest}",
    "/cart",
    "/checkout",
    "/orders",
    "/orders/{*rest}",
    "/auth/login",
    "/auth/register",
    "/admin",
    "/admin/{*rest}",
];

pub fn routes() -> Router<AppState> {
    PAGE_ROUTES
        .iter()
        .fold(Router::new(), |router, path| router.route(path, get(page_handler)))
}
