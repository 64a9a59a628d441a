//! # CSRF (Cross-Site Request Forgery) Protection
//!
//! Double-submit tokens for cookie-authenticated API writes.
//!
//! Tokens are HMAC-SHA256 signed using the secret from [`CsrfConfig`] and
//! follow the format:
//!
//! ```text
//! v1.<nonce_b64>.<mac_b64>
//! ```
//!
//! - Nonce and MAC are 32 bytes each
//! - Encoded using Base64 (URL-safe, no padding)
//! - The token travels in the `csrf` cookie and the `X-CSRF-Token` header
//!
//! [`csrf_handler`] issues or refreshes the token (mounted at
//! `/api/auth/csrf`). [`csrf_guard`] rejects unsafe API requests whose
//! header and cookie do not match, unless they carry an `Authorization`
//! header. Both are no-ops while CSRF is disabled.
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Router, middleware, routing::{get, post}};
//! use khanom_shop::config::csrf::CsrfConfig;
//! use khanom_shop::web::csrf::{CsrfGuard, csrf_guard, csrf_handler};
//!
//! let cfg = Arc::new(CsrfConfig::from_env_with(|k| std::env::var(k).ok()));
//! let guard = CsrfGuard::new(cfg.clone(), "/api");
//! let app: Router = Router::new()
//!     .route("/api/auth/csrf", get(csrf_handler))
//!     .route("/api/orders", post(|| async { "created" }))
//!     .layer(middleware::from_fn_with_state(guard, csrf_guard))
//!     .with_state(cfg);
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CACHE_CONTROL},
    },
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::csrf::CsrfConfig;
use crate::error::api::json_message;

/// Cookie name used to store the CSRF token.
pub const CSRF_COOKIE_NAME: &str = "csrf";

/// HTTP header name used for CSRF verification.
pub const CSRF_HEADER_NAME: &str = "X-CSRF-Token";

pub const CSRF_REJECTION: &str = "CSRF token missing or invalid";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(cfg: &CsrfConfig, nonce: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(&cfg.secret).ok()?;
    mac.update(nonce);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Generates a new HMAC-signed CSRF token using the configured secret.
///
/// Format: `v1.<nonce>.<mac>` (Base64-URL encoded)
///
/// # Example
/// ```rust
/// use khanom_shop::config::csrf::CsrfConfig;
/// use khanom_shop::web::csrf::generate_csrf_token;
///
/// let cfg = CsrfConfig::disabled();
/// let token = generate_csrf_token(&cfg);
/// assert!(token.starts_with("v1."));
/// ```
pub fn generate_csrf_token(cfg: &CsrfConfig) -> String {
    let nonce: [u8; 32] = rand::random();
    // HMAC accepts keys of any length, so the tag is always present.
    let tag = mac_for(cfg, &nonce).unwrap_or_default();

    format!(
        "v1.{}.{}",
        URL_SAFE_NO_PAD.encode(nonce),
        URL_SAFE_NO_PAD.encode(tag)
    )
}

/// Verifies a CSRF token's HMAC signature and format.
pub fn verify_token(cfg: &CsrfConfig, token: &str) -> bool {
    let mut parts = token.split('.');
    let (Some(v), Some(nonce_b64), Some(mac_b64)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if parts.next().is_some() || v != "v1" {
        return false;
    }

    let Ok(nonce) = URL_SAFE_NO_PAD.decode(nonce_b64) else {
        return false;
    };
    let Ok(mac) = URL_SAFE_NO_PAD.decode(mac_b64) else {
        return false;
    };

    if nonce.len() != 32 || mac.len() != 32 {
        return false;
    }

    let Some(expected) = mac_for(cfg, &nonce) else {
        return false;
    };

    expected.as_slice().ct_eq(&mac).unwrap_u8() == 1
}

/// Sets the CSRF cookie using configuration flags (`Secure`, `HttpOnly`).
pub fn set_csrf_cookie(jar: CookieJar, cfg: &CsrfConfig, token: &str) -> CookieJar {
    let cookie = Cookie::build((CSRF_COOKIE_NAME, token.to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(cfg.cookie_secure)
        .http_only(cfg.cookie_http_only)
        .build();
    jar.add(cookie)
}

/// Validates a CSRF token pair (header + cookie).
///
/// Returns `true` only if both are present, identical, and correctly signed.
pub fn validate_csrf(headers: &HeaderMap, jar: &CookieJar, cfg: &CsrfConfig) -> bool {
    let Some(header_token) = headers
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
    else {
        return false;
    };
    let Some(cookie_token) = jar.get(CSRF_COOKIE_NAME).map(|c| c.value().to_string()) else {
        return false;
    };

    if header_token
        .as_bytes()
        .ct_eq(cookie_token.as_bytes())
        .unwrap_u8()
        != 1
    {
        return false;
    }

    verify_token(cfg, &cookie_token)
}

/// JSON body returned by [`csrf_handler`].
#[derive(Debug, Serialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
    pub enabled: bool,
}

/// Issues or refreshes a CSRF token.
///
/// - A valid cookie token is reused.
/// - Otherwise a new token is generated and set in a `Set-Cookie` header.
/// - The token is also returned as JSON for the frontend.
pub async fn csrf_handler(
    State(cfg): State<Arc<CsrfConfig>>,
    jar: CookieJar,
) -> (CookieJar, [(axum::http::HeaderName, HeaderValue); 1], Json<CsrfResponse>) {
    let token = match jar
        .get(CSRF_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|t| verify_token(&cfg, t))
    {
        Some(t) => t,
        None => generate_csrf_token(&cfg),
    };

    let jar = set_csrf_cookie(jar, &cfg, &token);

    (
        jar,
        [(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        )],
        Json(CsrfResponse {
            csrf_token: token,
            enabled: cfg.is_enabled(),
        }),
    )
}

/// State for [`csrf_guard`].
#[derive(Clone, Debug)]
pub struct CsrfGuard {
    config: Arc<CsrfConfig>,
    api_prefix: String,
}

impl CsrfGuard {
    pub fn new(config: Arc<CsrfConfig>, api_prefix: impl Into<String>) -> Self {
        Self {
            config,
            api_prefix: api_prefix.into(),
        }
    }

    /// Whether this request must pass the double-submit check.
    pub fn applies_to(&self, method: &Method, path: &str, headers: &HeaderMap) -> bool {
        self.config.is_enabled()
            && is_unsafe(method)
            && under_prefix(path, &self.api_prefix)
            && !headers.contains_key(AUTHORIZATION)
    }
}

fn is_unsafe(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Axum middleware enforcing [`validate_csrf`] where [`CsrfGuard::applies_to`].
pub async fn csrf_guard(State(guard): State<CsrfGuard>, req: Request, next: Next) -> Response {
    if guard.applies_to(req.method(), req.uri().path(), req.headers()) {
        let jar = CookieJar::from_headers(req.headers());
        if !validate_csrf(req.headers(), &jar, &guard.config) {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "csrf check failed"
            );
            return json_message(StatusCode::FORBIDDEN, CSRF_REJECTION);
        }
    }
    next.run(req).await
}
