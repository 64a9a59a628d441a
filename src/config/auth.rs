//! # Authentication Configuration
//!
//! Signing secret and cookie settings for the token service and the
//! authorization gate.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `JWT_SECRET` | HMAC signing secret | *required* |
//! | `JWT_TTL_SECS` | token lifetime, at most ten years | `86400` |
//! | `JWT_CLOCK_SKEW_SECS` | verification leeway, at most one hour | `60` |
//! | `AUTH_COOKIE_SECURE` | `Secure` flag on the auth cookie | `true` in production |
//! | `AUTH_SESSION_COOKIE` | alternate session cookie name | *unset* |
//! | `AUTH_FORBIDDEN_REDIRECT` | page redirect for a signed-in user lacking the role | `/` |
//!
//! A missing `JWT_SECRET` is a hard error. There is no fallback value.

use std::fmt;

use chrono::Duration;

use crate::auth::credential::CookieNames;
use crate::config::env::{read_flag_from, read_parsed_from, read_string_from, require_from};
use crate::config::error::ConfigError;

pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 60;

const MAX_TOKEN_TTL_DAYS: i64 = 3650;
pub const MAX_TOKEN_TTL_SECS: u64 = MAX_TOKEN_TTL_DAYS as u64 * 24 * 60 * 60;
pub const MAX_CLOCK_SKEW_SECS: u64 = 60 * 60;

/// Secrets shorter than this are accepted but logged as weak.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

pub const DEFAULT_FORBIDDEN_REDIRECT: &str = "/";

#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub clock_skew_secs: u64,
    pub cookie_secure: bool,
    pub cookies: CookieNames,
    pub forbidden_redirect: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookies", &self.cookies)
            .field("forbidden_redirect", &self.forbidden_redirect)
            .finish()
    }
}

impl AuthConfig {
    /// Loads configuration using a custom key provider.
    ///
    /// `production` selects the default for `AUTH_COOKIE_SECURE`.
    pub fn from_env_with<F>(get: F, production: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = require_from(&get, "JWT_SECRET")?;
        if jwt_secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                len = jwt_secret.len(),
                "JWT_SECRET is shorter than {RECOMMENDED_SECRET_LEN} bytes"
            );
        }

        let token_ttl_secs = read_parsed_from(&get, "JWT_TTL_SECS").unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        if token_ttl_secs == 0 || token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_SECS",
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
            });
        }

        let clock_skew_secs =
            read_parsed_from(&get, "JWT_CLOCK_SKEW_SECS").unwrap_or(DEFAULT_CLOCK_SKEW_SECS);
        if clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(ConfigError::Invalid {
                name: "JWT_CLOCK_SKEW_SECS",
                reason: format!("must be at most {MAX_CLOCK_SKEW_SECS}"),
            });
        }

        let forbidden_redirect = read_string_from(&get, "AUTH_FORBIDDEN_REDIRECT")
            .unwrap_or_else(|| DEFAULT_FORBIDDEN_REDIRECT.to_string());
        if !forbidden_redirect.starts_with('/') || forbidden_redirect.starts_with("//") {
            return Err(ConfigError::Invalid {
                name: "AUTH_FORBIDDEN_REDIRECT",
                reason: "must be a same-site path starting with `/`".into(),
            });
        }

        Ok(Self {
            jwt_secret,
            token_ttl_secs,
            clock_skew_secs,
            cookie_secure: read_flag_from(&get, "AUTH_COOKIE_SECURE", production),
            cookies: CookieNames {
                session: read_string_from(&get, "AUTH_SESSION_COOKIE"),
                ..CookieNames::default()
            },
            forbidden_redirect,
        })
    }

    /// Token lifetime as a [`Duration`].
    pub fn token_ttl(&self) -> Duration {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::days(MAX_TOKEN_TTL_DAYS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn provider(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_secret_fails_fast() {
        let err = AuthConfig::from_env_with(provider(&[]), false).unwrap_err();

        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AuthConfig::from_env_with(provider(&[("JWT_SECRET", "k")]), false).unwrap();

        assert_eq!(cfg.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(cfg.clock_skew_secs, 60);
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.cookies, CookieNames::default());
        assert_eq!(cfg.forbidden_redirect, "/");
    }

    #[test]
    fn production_defaults_to_secure_cookie() {
        let cfg = AuthConfig::from_env_with(provider(&[("JWT_SECRET", "k")]), true).unwrap();

        assert!(cfg.cookie_secure);
    }

    #[test]
    fn overrides_are_respected() {
        let cfg = AuthConfig::from_env_with(
            provider(&[
                ("JWT_SECRET", "k"),
                ("JWT_TTL_SECS", "3600"),
                ("JWT_CLOCK_SKEW_SECS", "5"),
                ("AUTH_COOKIE_SECURE", "false"),
                ("AUTH_SESSION_COOKIE", "next-session"),
            ]),
            true,
        )
        .unwrap();

        assert_eq!(cfg.token_ttl_secs, 3600);
        assert_eq!(cfg.clock_skew_secs, 5);
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.cookies.session.as_deref(), Some("next-session"));
    }

    #[test]
    fn zero_ttl_is_invalid() {
        let err = AuthConfig::from_env_with(
            provider(&[("JWT_SECRET", "k"), ("JWT_TTL_SECS", "0")]),
            false,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name: "JWT_TTL_SECS", .. }));
    }

    #[test]
    fn oversized_lifetimes_are_invalid() {
        let too_long = (MAX_TOKEN_TTL_SECS + 1).to_string();
        for (name, value) in [
            ("JWT_TTL_SECS", too_long.as_str()),
            ("JWT_TTL_SECS", "18446744073709551615"),
            ("JWT_CLOCK_SKEW_SECS", "3601"),
        ] {
            let err = AuthConfig::from_env_with(provider(&[("JWT_SECRET", "k"), (name, value)]), false)
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: n, .. } if n == name),
                "{name}={value}"
            );
        }

        let longest = MAX_TOKEN_TTL_SECS.to_string();
        let cfg = AuthConfig::from_env_with(
            provider(&[("JWT_SECRET", "k"), ("JWT_TTL_SECS", longest.as_str())]),
            false,
        )
        .unwrap();
        assert_eq!(cfg.token_ttl(), Duration::days(3650));
    }

    #[test]
    fn forbidden_redirect_must_be_a_local_path() {
        let cfg = AuthConfig::from_env_with(
            provider(&[("JWT_SECRET", "k"), ("AUTH_FORBIDDEN_REDIRECT", "/products")]),
            false,
        )
        .unwrap();
        assert_eq!(cfg.forbidden_redirect, "/products");

        for bad in ["https://evil.example", "//evil.example"] {
            let err = AuthConfig::from_env_with(
                provider(&[("JWT_SECRET", "k"), ("AUTH_FORBIDDEN_REDIRECT", bad)]),
                false,
            )
            .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid { name: "AUTH_FORBIDDEN_REDIRECT", .. }
            ));
        }
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = AuthConfig::from_env_with(provider(&[("JWT_SECRET", "hunter2")]), false).unwrap();

        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
