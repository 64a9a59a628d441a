use axum::{http::StatusCode, response::Response};

use crate::error::api::json_message;

/// Final fallback of the router: `404 {"message": "Not found"}`.
pub async fn not_found() -> Response {
    json_message(StatusCode::NOT_FOUND, "Not found")
}
