//! # Authorization Gate Middleware
//!
//! Runs in front of every route:
//!
//! 1. strips client-supplied `x-user-*` headers
//! 2. classifies the request against the [`RouteTable`]
//! 3. for non-public routes, extracts and verifies a credential
//! 4. either forwards the request with the [`Principal`] attached (request
//!    extension plus `x-user-id` / `x-user-email` / `x-user-role` headers)
//!    or answers with a deny response
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Router, middleware, routing::get};
//! use chrono::Duration;
//! use khanom_shop::auth::{CookieNames, TokenService};
//! use khanom_shop::gate::{AuthorizationGate, RouteTable, authorization_gate};
//! use khanom_shop::time::SystemClock;
//!
//! let tokens = TokenService::new(b"secret", Duration::hours(24), 60, Arc::new(SystemClock));
//! let gate = Arc::new(AuthorizationGate::new(
//!     RouteTable::storefront().unwrap(),
//!     Arc::new(tokens),
//!     CookieNames::default(),
//! ));
//! let app: Router = Router::new()
//!     .route("/api/orders", get(|| async { "orders" }))
//!     .layer(middleware::from_fn_with_state(gate, authorization_gate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Uri},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::credential::extract_credential;
use crate::auth::{AuthError, CookieNames, Principal, TokenService};
use crate::gate::decision::{Decision, evaluate};
use crate::gate::response::{DenyResponder, RequestClass};
use crate::gate::routes::{Policy, RouteTable};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const IDENTITY_HEADER_PREFIX: &str = "x-user-";

/// Everything the gate needs, shared immutably across requests.
#[derive(Debug)]
pub struct AuthorizationGate {
    table: RouteTable,
    tokens: Arc<TokenService>,
    cookies: CookieNames,
    responder: DenyResponder,
}

/// Outcome of [`AuthorizationGate::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub policy: Policy,
    pub class: RequestClass,
    pub decision: Decision,
}

impl AuthorizationGate {
    pub fn new(table: RouteTable, tokens: Arc<TokenService>, cookies: CookieNames) -> Self {
        Self {
            table,
            tokens,
            cookies,
            responder: DenyResponder::default(),
        }
    }

    /// Replaces the deny responder (login path, forbidden destination).
    pub fn with_responder(mut self, responder: DenyResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Classifies and evaluates one request without touching it.
    pub fn decide(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Verdict {
        let path = uri.path();
        let policy = self.table.classify(method, path);
        let class = RequestClass::of(self.table.is_api_path(path), headers);

        let decision = if policy == Policy::Public {
            Decision::Allow { principal: None }
        } else {
            let jar = CookieJar::from_headers(headers);
            evaluate(
                policy,
                extract_credential(&jar, headers, &self.cookies),
                &self.tokens,
            )
        };

        Verdict {
            policy,
            class,
            decision,
        }
    }

    pub fn deny_response(
        &self,
        class: RequestClass,
        error: &AuthError,
        clear_cookie: Option<&str>,
        uri: &Uri,
    ) -> Response {
        self.responder.deny_response(class, error, clear_cookie, uri)
    }
}

/// Removes every `x-user-*` header.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    let spoofed: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with(IDENTITY_HEADER_PREFIX))
        .cloned()
        .collect();
    for name in spoofed {
        headers.remove(&name);
    }
}

/// Mirrors the principal into identity headers.
pub fn insert_identity_headers(headers: &mut HeaderMap, principal: &Principal) {
    let pairs = [
        (USER_ID_HEADER, principal.id.as_str()),
        (USER_EMAIL_HEADER, principal.email.as_str()),
        (USER_ROLE_HEADER, principal.role.as_str()),
    ];
    for (name, value) in pairs {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(HeaderName::from_static(name), v);
            }
            Err(_) => tracing::debug!(header = name, "identity value is not a valid header value"),
        }
    }
}

/// Axum middleware applying an [`AuthorizationGate`].
pub async fn authorization_gate(
    State(gate): State<Arc<AuthorizationGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    strip_identity_headers(req.headers_mut());

    let verdict = gate.decide(req.method(), req.uri(), req.headers());

    match verdict.decision {
        Decision::Allow { principal } => {
            if let Some(principal) = principal {
                tracing::debug!(
                    path = %req.uri().path(),
                    policy = %verdict.policy,
                    user_id = %principal.id,
                    "request authorized"
                );
                insert_identity_headers(req.headers_mut(), &principal);
                req.extensions_mut().insert(principal);
            }
            next.run(req).await
        }
        Decision::Deny {
            error,
            clear_cookie,
        } => {
            if matches!(error, AuthError::NoCredential) {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    policy = %verdict.policy,
                    "request denied: no credential"
                );
            } else {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    policy = %verdict.policy,
                    reason = %error,
                    "request denied"
                );
            }
            gate.deny_response(verdict.class, &error, clear_cookie.as_deref(), req.uri())
        }
    }
}
