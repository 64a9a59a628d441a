//! Shared router fixtures for the end-to-end tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use khanom_shop::app::{AppState, build_router};
use khanom_shop::auth::{PasswordHasher, Principal, Role, TokenService};
use khanom_shop::config::AppConfig;
use khanom_shop::store::{MemoryStore, Store, seed::seed};
use khanom_shop::time::{Clock, FixedClock};
use khanom_shop::web::spa::PageShell;
use serde_json::Value;

pub const SECRET: &str = "integration-signing-secret-0123456789";
pub const NOW: i64 = 1_700_000_000;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Router over a seeded in-memory store, with `extra` layered on top
    /// of the signing secret.
    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let config = AppConfig::from_env_with(|key| {
            if key == "JWT_SECRET" {
                return Some(SECRET.to_string());
            }
            extra
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .expect("test configuration");

        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_timestamp(NOW));
        let mut state = AppState::new(
            &config,
            Store::memory(MemoryStore::new()),
            clock,
            PageShell::default(),
        );
        state.hasher = PasswordHasher::with_cost(4);
        seed(&state.store, &state.hasher, state.now()).expect("seed");

        let router = build_router(state.clone(), &config).expect("router");
        Self { router, state }
    }

    pub fn token_for(&self, role: Role) -> String {
        let principal = Principal::new("principal-1", "someone@example.com", role);
        self.state.tokens.issue(&principal).expect("token")
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router.clone().oneshot(req).await.expect("infallible router")
    }
}

/// Token signed with `secret`, issued at `issued_at` for one hour.
pub fn foreign_token(secret: &[u8], issued_at: i64, role: Role) -> String {
    let tokens = TokenService::new(
        secret,
        Duration::hours(1),
        60,
        Arc::new(FixedClock::at_timestamp(issued_at)),
    );
    tokens
        .issue(&Principal::new("principal-1", "someone@example.com", role))
        .expect("token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn auth_cookie(token: &str) -> String {
    format!("auth-token={token}")
}

pub async fn json_body(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Every `Set-Cookie` value on the response.
pub fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}
