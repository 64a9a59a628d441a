//! # CORS
//!
//! Browser access for the storefront frontend. Preflights are answered by
//! the layer itself, outside the authorization gate, so an `OPTIONS`
//! request never needs a credential.
//!
//! Credentials must be enabled (`CORS_CREDENTIALS=true`) for the
//! `auth-token` cookie to travel cross-origin.
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use khanom_shop::config::web::CorsConfig;
//! use khanom_shop::web::cors::build_cors;
//!
//! let cfg = CorsConfig {
//!     origins: vec!["https://shop.example".into()],
//!     credentials: true,
//! };
//! let app: Router = Router::new()
//!     .route("/api/products", get(|| async { "[]" }))
//!     .layer(build_cors(&cfg));
//! ```

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::web::{CorsConfig, DEFAULT_CORS_ORIGIN};

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

const API_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

fn allowed_origins(cors: &CorsConfig) -> Vec<HeaderValue> {
    let valid: Vec<HeaderValue> = cors
        .origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%origin, "ignoring CORS origin that is not a valid header value");
                None
            }
        })
        .collect();

    if valid.is_empty() {
        vec![HeaderValue::from_static(DEFAULT_CORS_ORIGIN)]
    } else {
        valid
    }
}

/// Builds the [`CorsLayer`] for the API verbs and the `Content-Type`,
/// `Authorization` and CSRF request headers.
///
/// Origins are always listed explicitly: a wildcard cannot be combined with
/// credentials.
pub fn build_cors(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(cors)))
        .allow_methods(API_METHODS)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ])
        .max_age(PREFLIGHT_MAX_AGE);

    if cors.credentials {
        layer.allow_credentials(true)
    } else {
        layer
    }
}
