//! # Application Assembly
//!
//! [`AppState`] bundles the shared services handlers need. [`build_router`]
//! wires the API and page routes behind the cross-cutting layers. From the
//! outside in:
//!
//! 1. `TraceLayer` request spans
//! 2. CORS (answers preflights before any auth check)
//! 3. request body limit
//! 4. authorization gate
//! 5. CSRF double-submit check

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
};
use chrono::NaiveDateTime;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::auth::{CookieNames, PasswordHasher, TokenService};
use crate::config::{AppConfig, csrf::CsrfConfig};
use crate::gate::{AuthorizationGate, DenyResponder, RouteTable, RouteTableError, authorization_gate};
use crate::model::db_timestamp;
use crate::store::Store;
use crate::time::Clock;
use crate::web::{
    api,
    cors::build_cors,
    csrf::{CsrfGuard, csrf_guard},
    fallback::not_found,
    spa::{self, PageShell, PageState},
};

/// Auth cookie settings used when issuing or clearing credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCookies {
    pub cookies: CookieNames,
    pub cookie_secure: bool,
}

/// Shared, immutable application services.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub clock: Arc<dyn Clock>,
    pub session: SessionCookies,
    pub csrf: Arc<CsrfConfig>,
    pub shell: PageShell,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Store, clock: Arc<dyn Clock>, shell: PageShell) -> Self {
        let tokens = TokenService::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl(),
            config.auth.clock_skew_secs,
            clock.clone(),
        );

        Self {
            store,
            tokens: Arc::new(tokens),
            hasher: PasswordHasher::default(),
            clock,
            session: SessionCookies {
                cookies: config.auth.cookies.clone(),
                cookie_secure: config.auth.cookie_secure,
            },
            csrf: Arc::new(config.csrf.clone()),
            shell,
        }
    }

    /// Current time, truncated for storage.
    pub fn now(&self) -> NaiveDateTime {
        db_timestamp(self.clock.now().naive_utc())
    }
}

impl FromRef<AppState> for Arc<CsrfConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.csrf.clone()
    }
}

impl FromRef<AppState> for PageState {
    fn from_ref(state: &AppState) -> Self {
        PageState {
            shell: state.shell.clone(),
            csrf: state.csrf.clone(),
        }
    }
}

/// Builds the full application router.
///
/// # Errors
/// [`RouteTableError`] when the route table is inconsistent.
pub fn build_router(state: AppState, config: &AppConfig) -> Result<Router, RouteTableError> {
    let gate = AuthorizationGate::new(
        RouteTable::storefront()?,
        state.tokens.clone(),
        config.auth.cookies.clone(),
    )
    .with_responder(DenyResponder::new(config.auth.forbidden_redirect.clone()));
    let csrf = CsrfGuard::new(state.csrf.clone(), gate.table().api_prefix());
    tracing::debug!(
        rules = gate.table().rules().len(),
        api_prefix = gate.table().api_prefix(),
        "authorization gate configured"
    );

    let router = Router::new()
        .merge(api::routes())
        .merge(spa::routes())
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(csrf, csrf_guard))
        .layer(middleware::from_fn_with_state(Arc::new(gate), authorization_gate))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.http.max_body_bytes))
        .layer(build_cors(&config.cors))
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

#[cfg(test)]
impl AppState {
    /// Seeded in-memory state with a fixed clock and cheap password hashing.
    pub(crate) fn for_tests() -> Self {
        use crate::store::{MemoryStore, seed::seed};
        use crate::time::FixedClock;

        let config = AppConfig::from_env_with(|k| match k {
            "JWT_SECRET" => Some("unit-test-signing-secret-of-decent-length".into()),
            _ => None,
        })
        .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_timestamp(1_700_000_000));
        let mut state = Self::new(&config, Store::memory(MemoryStore::new()), clock, PageShell::default());
        state.hasher = PasswordHasher::with_cost(4);
        seed(&state.store, &state.hasher, state.now()).unwrap();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn config() -> AppConfig {
        AppConfig::from_env_with(|k| match k {
            "JWT_SECRET" => Some("unit-test-signing-secret-of-decent-length".into()),
            "HTTP_MAX_BODY_BYTES" => Some("64".into()),
            _ => None,
        })
        .unwrap()
    }

    fn app() -> Router {
        build_router(AppState::for_tests(), &config()).unwrap()
    }

    #[tokio::test]
    async fn unknown_api_path_is_denied_before_fallback() {
        let res = app()
            .oneshot(Request::get("/api/nothing-here").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_page_is_json_404() {
        let res = app()
            .oneshot(Request::get("/no-such-page").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"message":"Not found"}"#);
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let res = app()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, "1024")
                    .body(Body::from(vec![b' '; 1024]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn public_page_renders_shell() {
        let res = app()
            .oneshot(Request::get("/products").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::SET_COOKIE).is_some());
    }
}
