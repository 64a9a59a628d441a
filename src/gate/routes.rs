//! # Route Classification
//!
//! Maps every request (method + path) to exactly one [`Policy`].
//!
//! ## Precedence
//! The most specific matching rule wins, independent of insertion order:
//!
//! 1. an exact pattern beats any prefix pattern
//! 2. a longer prefix beats a shorter one
//! 3. for the same pattern, a method-restricted rule beats an any-method rule
//!
//! Two rules with the same pattern and overlapping method scopes are a
//! [`RouteTableError::Conflict`] at build time.
//!
//! Prefixes match on segment boundaries: `/api/products` covers
//! `/api/products` and `/api/products/7`, never `/api/productsX`.
//!
//! Unmatched paths fall back to [`Policy::Protected`] under the API prefix
//! and [`Policy::Public`] elsewhere.

use std::fmt;

use axum::http::Method;
use thiserror::Error;

/// Default prefix identifying API routes.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Access policy attached to a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    /// No credential is looked up.
    Public,
    /// Any authenticated principal.
    Protected,
    /// Authenticated principal with role `ADMIN`.
    AdminOnly,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Public => "PUBLIC",
            Policy::Protected => "PROTECTED",
            Policy::AdminOnly => "ADMIN_ONLY",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Pattern {
    pub fn path(&self) -> &str {
        match self {
            Pattern::Exact(p) | Pattern::Prefix(p) => p,
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(p) => path == p,
            Pattern::Prefix(p) if p == "/" => true,
            Pattern::Prefix(p) => path
                .strip_prefix(p.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }

    /// Sort key: higher is more specific.
    fn rank(&self) -> (bool, usize) {
        match self {
            Pattern::Exact(p) => (true, p.len()),
            Pattern::Prefix(p) => (false, p.len()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(p) => write!(f, "{p}"),
            Pattern::Prefix(p) => write!(f, "{p}/**"),
        }
    }
}

/// One row of the classification table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: Pattern,
    /// `None` applies to every method.
    pub methods: Option<Vec<Method>>,
    pub policy: Policy,
}

impl RouteRule {
    fn applies_to(&self, method: &Method) -> bool {
        self.methods.as_ref().is_none_or(|ms| ms.contains(method))
    }

    fn overlaps(&self, other: &RouteRule) -> bool {
        if self.pattern != other.pattern {
            return false;
        }
        match (&self.methods, &other.methods) {
            (None, None) => true,
            (Some(a), Some(b)) => a.iter().any(|m| b.contains(m)),
            _ => false,
        }
    }

    fn methods_label(&self) -> String {
        match &self.methods {
            None => "*".to_string(),
            Some(ms) => ms.iter().map(Method::as_str).collect::<Vec<_>>().join(","),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("conflicting rules for {pattern} [{methods}]")]
    Conflict { pattern: String, methods: String },

    #[error("invalid route pattern `{0}`: must start with `/`")]
    InvalidPattern(String),

    #[error("empty method list for `{0}`")]
    EmptyMethods(String),
}

/// Builder for [`RouteTable`].
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    rules: Vec<RouteRule>,
    api_prefix: Option<String>,
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl RouteTableBuilder {
    /// Overrides the API prefix (default `/api`).
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    pub fn exact(self, path: &str, policy: Policy) -> Self {
        self.push(Pattern::Exact(normalize(path).to_string()), None, policy)
    }

    pub fn prefix(self, path: &str, policy: Policy) -> Self {
        self.push(Pattern::Prefix(normalize(path).to_string()), None, policy)
    }

    pub fn exact_for(self, methods: &[Method], path: &str, policy: Policy) -> Self {
        self.push(
            Pattern::Exact(normalize(path).to_string()),
            Some(methods.to_vec()),
            policy,
        )
    }

    pub fn prefix_for(self, methods: &[Method], path: &str, policy: Policy) -> Self {
        self.push(
            Pattern::Prefix(normalize(path).to_string()),
            Some(methods.to_vec()),
            policy,
        )
    }

    fn push(mut self, pattern: Pattern, methods: Option<Vec<Method>>, policy: Policy) -> Self {
        self.rules.push(RouteRule {
            pattern,
            methods,
            policy,
        });
        self
    }

    /// Validates the rules and orders them by specificity.
    ///
    /// # Errors
    /// - [`RouteTableError::InvalidPattern`] for a pattern not starting with `/`
    /// - [`RouteTableError::EmptyMethods`] for a method list with no entries
    /// - [`RouteTableError::Conflict`] for overlapping rules on one pattern
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        for (i, rule) in self.rules.iter().enumerate() {
            if !rule.pattern.path().starts_with('/') {
                return Err(RouteTableError::InvalidPattern(rule.pattern.path().to_string()));
            }
            if rule.methods.as_ref().is_some_and(Vec::is_empty) {
                return Err(RouteTableError::EmptyMethods(rule.pattern.to_string()));
            }
            if let Some(other) = self.rules[..i].iter().find(|r| r.overlaps(rule)) {
                return Err(RouteTableError::Conflict {
                    pattern: rule.pattern.to_string(),
                    methods: format!("{} vs {}", other.methods_label(), rule.methods_label()),
                });
            }
        }

        let mut rules = self.rules;
        rules.sort_by(|a, b| {
            b.pattern
                .rank()
                .cmp(&a.pattern.rank())
                .then_with(|| b.methods.is_some().cmp(&a.methods.is_some()))
        });

        Ok(RouteTable {
            rules,
            api_prefix: normalize(
                self.api_prefix
                    .as_deref()
                    .unwrap_or(DEFAULT_API_PREFIX),
            )
            .to_string(),
        })
    }
}

/// An immutable, precedence-ordered classification table.
#[derive(Clone, Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    api_prefix: String,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The storefront's table.
    ///
    /// | Pattern | Methods | Policy |
    /// |---|---|---|
    /// | `/api/auth/register`, `/login`, `/logout` | POST | public |
    /// | `/api/auth/csrf` | GET | public |
    /// | `/api/auth/me` | * | protected |
    /// | `/api/products/**` | GET | public |
    /// | `/api/products/**` | POST, PUT, DELETE | admin |
    /// | `/api/orders/**` | * | protected |
    /// | `/api/admin/**` | * | admin |
    /// | `/checkout/**`, `/orders/**` | * | protected |
    /// | `/admin/**` | * | admin |
    pub fn storefront() -> Result<RouteTable, RouteTableError> {
        let admin_writes = [Method::POST, Method::PUT, Method::DELETE];
        Self::builder()
            .exact_for(&[Method::POST], "/api/auth/register", Policy::Public)
            .exact_for(&[Method::POST], "/api/auth/login", Policy::Public)
            .exact_for(&[Method::POST], "/api/auth/logout", Policy::Public)
            .exact_for(&[Method::GET], "/api/auth/csrf", Policy::Public)
            .exact("/api/auth/me", Policy::Protected)
            .prefix_for(&[Method::GET, Method::HEAD], "/api/products", Policy::Public)
            .prefix_for(&admin_writes, "/api/products", Policy::AdminOnly)
            .prefix("/api/orders", Policy::Protected)
            .prefix("/api/admin", Policy::AdminOnly)
            .prefix("/checkout", Policy::Protected)
            .prefix("/orders", Policy::Protected)
            .prefix("/admin", Policy::AdminOnly)
            .build()
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// `true` when `path` lies under the API prefix.
    pub fn is_api_path(&self, path: &str) -> bool {
        Pattern::Prefix(self.api_prefix.clone()).matches(normalize(path))
    }

    /// Policy for paths no rule covers.
    pub fn default_policy(&self, path: &str) -> Policy {
        if self.is_api_path(path) {
            Policy::Protected
        } else {
            Policy::Public
        }
    }

    /// Resolves the policy for one request.
    pub fn classify(&self, method: &Method, path: &str) -> Policy {
        let path = normalize(path);
        self.rules
            .iter()
            .find(|r| r.pattern.matches(path) && r.applies_to(method))
            .map(|r| r.policy)
            .unwrap_or_else(|| self.default_policy(path))
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
