//! # HTTP and CORS Configuration

use crate::config::env::{read_flag_from, read_parsed_from, read_string_from};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// The frontend dev server.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// HTTP server configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl HttpConfig {
    /// `HTTP_MAX_BODY_BYTES` wins over `HTTP_MAX_BODY_MB` (default 5 MB).
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_body_bytes = read_parsed_from::<usize, _>(&get, "HTTP_MAX_BODY_BYTES")
            .or_else(|| read_parsed_from::<usize, _>(&get, "HTTP_MAX_BODY_MB").map(|mb| mb * 1024 * 1024))
            .unwrap_or(5 * 1024 * 1024);

        Self {
            bind_addr: read_string_from(&get, "BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_body_bytes,
        }
    }
}

/// Origins allowed to call the API from a browser.
///
/// `CORS_ORIGINS` is comma-separated; blank entries are dropped and an empty
/// list falls back to [`DEFAULT_CORS_ORIGIN`].
#[derive(Clone, Debug, PartialEq)]
pub struct CorsConfig {
    pub origins: Vec<String>,
    pub credentials: bool,
}

impl CorsConfig {
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() {
            origins.push(DEFAULT_CORS_ORIGIN.to_string());
        }

        Self {
            origins,
            credentials: read_flag_from(&get, "CORS_CREDENTIALS", false),
        }
    }
}
