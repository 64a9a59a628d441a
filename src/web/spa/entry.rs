use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::CookieJar;

use crate::config::csrf::CsrfConfig;
use crate::web::csrf::{generate_csrf_token, set_csrf_cookie};

/// Placeholder replaced with a fresh CSRF token on every render.
pub const CSRF_PLACEHOLDER: &str = "{{ csrf_token }}";

const BUILTIN_SHELL: &str = r#"<!doctype html>
<html lang="th">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="csrf-token" content="{{ csrf_token }}" />
    <title>Khanom Thai Desserts</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/assets/main.js"></script>
  </body>
</html>
"#;

/// HTML document served for every page route.
///
/// Must contain [`CSRF_PLACEHOLDER`] somewhere, typically in a `<meta>` tag
/// the frontend reads before sending API writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageShell {
    html: Arc<str>,
}

impl Default for PageShell {
    fn default() -> Self {
        Self::from_html(BUILTIN_SHELL)
    }
}

impl PageShell {
    pub fn from_html(html: impl Into<Arc<str>>) -> Self {
        Self { html: html.into() }
    }

    /// Reads the shell from `path`, or uses the built-in one when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("reading page shell {}", path.display()))?;
        if !html.contains(CSRF_PLACEHOLDER) {
            tracing::warn!(
                path = %path.display(),
                "page shell has no {CSRF_PLACEHOLDER} placeholder"
            );
        }
        Ok(Self::from_html(html))
    }

    pub fn render(&self, csrf_token: &str) -> String {
        self.html.replace(CSRF_PLACEHOLDER, csrf_token)
    }
}

/// Shared state of [`page_handler`].
#[derive(Clone, Debug)]
pub struct PageState {
    pub shell: PageShell,
    pub csrf: Arc<CsrfConfig>,
}

/// Serves the page shell with a fresh CSRF token in both the HTML and the
/// `csrf` cookie.
///
/// Access control happens before this runs: the gate has already
/// redirected anonymous or under-privileged visitors of protected pages.
pub async fn page_handler(State(state): State<PageState>, jar: CookieJar) -> impl IntoResponse {
    let token = generate_csrf_token(&state.csrf);
    let jar = set_csrf_cookie(jar, &state.csrf, &token);

    (jar, Html(state.shell.render(&token)))
}
