//! # Deny Responses
//!
//! API-class requests get `{"message": ...}` with 401 or 403. Page-class
//! requests are redirected with `303 See Other`:
//!
//! - unauthenticated → `{login_path}?callbackUrl=<path[?query]>`
//! - authenticated but lacking the role → the forbidden destination
//!
//! A request is API-class when its path is under the API prefix or its
//! `Accept` header prefers JSON.

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::auth::AuthError;
use crate::auth::credential::removal_cookie;
use crate::config::auth::DEFAULT_FORBIDDEN_REDIRECT;
use crate::error::api::json_message;

/// Characters escaped in the callback value. `/` stays literal.
const CALLBACK_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const CALLBACK_PARAM: &str = "callbackUrl";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestClass {
    Api,
    Page,
}

impl RequestClass {
    pub fn of(is_api_path: bool, headers: &HeaderMap) -> Self {
        if is_api_path || prefers_json(headers) {
            RequestClass::Api
        } else {
            RequestClass::Page
        }
    }
}

/// `true` when the highest-weighted media range in `Accept` is JSON.
/// Ties go to the range listed first.
fn prefers_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mut best: Option<(&str, f32)> = None;
    for range in accept.split(',') {
        let mut parts = range.split(';').map(str::trim);
        let media = parts.next().unwrap_or_default();
        if media.is_empty() {
            continue;
        }
        let q = parts
            .find_map(|p| p.strip_prefix("q="))
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);
        if best.is_none_or(|(_, top)| q > top) {
            best = Some((media, q));
        }
    }

    best.is_some_and(|(media, q)| {
        q > 0.0 && (media.eq_ignore_ascii_case("application/json") || media.ends_with("+json"))
    })
}

/// Percent-encodes a path (plus query) for use as the callback value.
pub fn encode_callback(path_and_query: &str) -> String {
    utf8_percent_encode(path_and_query, CALLBACK_ESCAPES).to_string()
}

/// Builds deny responses for the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenyResponder {
    pub login_path: String,
    pub forbidden_redirect: String,
}

impl Default for DenyResponder {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            forbidden_redirect: DEFAULT_FORBIDDEN_REDIRECT.to_string(),
        }
    }
}

impl DenyResponder {
    pub fn new(forbidden_redirect: impl Into<String>) -> Self {
        Self {
            forbidden_redirect: forbidden_redirect.into(),
            ..Self::default()
        }
    }

    /// Login URL that returns the user to `uri` afterwards.
    pub fn login_location(&self, uri: &Uri) -> String {
        let target = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        format!(
            "{}?{}={}",
            self.login_path,
            CALLBACK_PARAM,
            encode_callback(target)
        )
    }

    pub fn deny_response(
        &self,
        class: RequestClass,
        error: &AuthError,
        clear_cookie: Option<&str>,
        uri: &Uri,
    ) -> Response {
        let response = match class {
            RequestClass::Api => json_message(error.status(), error.public_message()),
            RequestClass::Page if *error == AuthError::InsufficientRole => {
                see_other(&self.forbidden_redirect)
            }
            RequestClass::Page => see_other(&self.login_location(uri)),
        };

        match clear_cookie {
            Some(name) => (CookieJar::new().add(removal_cookie(name)), response).into_response(),
            None => response,
        }
    }
}

fn see_other(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response(),
        // Locations are built from encoded parts; reaching this means a
        // misconfigured login or forbidden path.
        Err(_) => {
            tracing::error!(location, "redirect location is not a valid header value");
            json_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
