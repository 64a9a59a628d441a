//! # Credential transport
//!
//! A token may arrive on several channels. They are tried in a fixed order
//! and the first non-empty value wins:
//!
//! 1. the `auth-token` cookie (set by `/api/auth/login`)
//! 2. an alternate session cookie, only when one is configured
//! 3. `Authorization: Bearer <token>`
//!
//! The module also builds the cookies that carry or clear a token.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::error::AuthError;

/// Name of the canonical auth cookie.
pub const AUTH_COOKIE_NAME: &str = "auth-token";

const BEARER_SCHEME: &str = "Bearer";

/// Cookie names consulted during extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieNames {
    pub auth: String,
    /// Alternate session cookie. `None` disables that channel.
    pub session: Option<String>,
}

impl Default for CookieNames {
    fn default() -> Self {
        Self {
            auth: AUTH_COOKIE_NAME.to_string(),
            session: None,
        }
    }
}

/// Where a credential was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    AuthCookie(String),
    SessionCookie(String),
    BearerHeader,
}

impl CredentialSource {
    /// Cookie to clear when this credential turns out to be invalid.
    pub fn cookie_name(&self) -> Option<&str> {
        match self {
            CredentialSource::AuthCookie(name) | CredentialSource::SessionCookie(name) => {
                Some(name)
            }
            CredentialSource::BearerHeader => None,
        }
    }
}

/// A raw, not yet verified token and its transport channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

/// Looks for a token on every configured channel, in priority order.
///
/// # Returns
/// - `Ok(Some(_))` for the first non-empty credential
/// - `Ok(None)` when no channel carries one
///
/// # Errors
/// [`AuthError::MalformedRequest`] when no cookie matched and the
/// `Authorization` header is present but is not a usable bearer token.
pub fn extract_credential(
    jar: &CookieJar,
    headers: &HeaderMap,
    names: &CookieNames,
) -> Result<Option<Credential>, AuthError> {
    if let Some(token) = cookie_value(jar, &names.auth) {
        return Ok(Some(Credential {
            token,
            source: CredentialSource::AuthCookie(names.auth.clone()),
        }));
    }

    if let Some(session) = names.session.as_deref() {
        if let Some(token) = cookie_value(jar, session) {
            return Ok(Some(Credential {
                token,
                source: CredentialSource::SessionCookie(session.to_string()),
            }));
        }
    }

    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = raw
        .to_str()
        .map_err(|_| AuthError::MalformedRequest("authorization header is not ASCII".into()))?;
    // Auth schemes are case-insensitive.
    let token = value
        .trim_start()
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MalformedRequest("expected a bearer token".into()))?;

    Ok(Some(Credential {
        token: token.to_string(),
        source: CredentialSource::BearerHeader,
    }))
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Builds the cookie that carries a freshly issued token.
pub fn auth_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Builds a cookie that makes the browser drop `name`.
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), String::new()))
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn names_with_session() -> CookieNames {
        CookieNames {
            auth: AUTH_COOKIE_NAME.into(),
            session: Some("session-token".into()),
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        h
    }

    #[test]
    fn auth_cookie_wins_over_everything() {
        let jar = CookieJar::new()
            .add(Cookie::new(AUTH_COOKIE_NAME, "from-cookie"))
            .add(Cookie::new("session-token", "from-session"));

        let c = extract_credential(&jar, &bearer("from-header"), &names_with_session())
            .unwrap()
            .unwrap();

        assert_eq!(c.token, "from-cookie");
        assert_eq!(c.source, CredentialSource::AuthCookie(AUTH_COOKIE_NAME.into()));
    }

    #[test]
    fn session_cookie_wins_over_header() {
        let jar = CookieJar::new().add(Cookie::new("session-token", "from-session"));

        let c = extract_credential(&jar, &bearer("from-header"), &names_with_session())
            .unwrap()
            .unwrap();

        assert_eq!(c.token, "from-session");
        assert_eq!(c.source.cookie_name(), Some("session-token"));
    }

    #[test]
    fn session_cookie_ignored_when_channel_disabled() {
        let jar = CookieJar::new().add(Cookie::new("session-token", "from-session"));

        let c = extract_credential(&jar, &bearer("from-header"), &CookieNames::default())
            .unwrap()
            .unwrap();

        assert_eq!(c.source, CredentialSource::BearerHeader);
        assert_eq!(c.token, "from-header");
    }

    #[test]
    fn empty_cookie_falls_through_to_header() {
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE_NAME, ""));

        let c = extract_credential(&jar, &bearer("abc"), &CookieNames::default())
            .unwrap()
            .unwrap();

        assert_eq!(c.token, "abc");
        assert_eq!(c.source.cookie_name(), None);
    }

    #[test]
    fn nothing_present_is_none() {
        let got = extract_credential(&CookieJar::new(), &HeaderMap::new(), &CookieNames::default());

        assert_eq!(got, Ok(None));
    }

    #[test]
    fn non_bearer_authorization_is_malformed() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));

        let got = extract_credential(&CookieJar::new(), &h, &CookieNames::default());

        assert!(matches!(got, Err(AuthError::MalformedRequest(_))));
    }

    #[test]
    fn bearer_scheme_ignores_case() {
        for value in ["bearer abc", "BEARER abc", "BeArEr  abc "] {
            let mut h = HeaderMap::new();
            h.insert(AUTHORIZATION, HeaderValue::from_static(value));

            let c = extract_credential(&CookieJar::new(), &h, &CookieNames::default())
                .unwrap()
                .unwrap();

            assert_eq!(c.token, "abc", "{value}");
            assert_eq!(c.source, CredentialSource::BearerHeader);
        }
    }

    #[test]
    fn empty_bearer_is_malformed() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));

        let got = extract_credential(&CookieJar::new(), &h, &CookieNames::default());

        assert!(matches!(got, Err(AuthError::MalformedRequest(_))));
    }

    #[test]
    fn auth_cookie_has_expected_attributes() {
        let c = auth_cookie(AUTH_COOKIE_NAME, "tok", 86_400, true);

        assert_eq!(c.value(), "tok");
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.secure(), Some(true));
        assert_eq!(c.same_site(), Some(SameSite::Strict));
        assert_eq!(c.max_age(), Some(time::Duration::seconds(86_400)));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let c = removal_cookie(AUTH_COOKIE_NAME);
        let header = c.to_string();

        assert_eq!(c.value(), "");
        assert!(header.contains("Max-Age=0"), "{header}");
        assert!(header.contains("Path=/"), "{header}");
    }
}
