//! # Environment Variable Utilities
//!
//! Helpers for reading configuration values with type conversion and
//! fallback defaults. Every reader takes a *provider* closure so config
//! structs can be built from a map in tests instead of the process
//! environment.
//!
//! # Examples
//! ```rust
//! use khanom_shop::config::env::{read_flag_from, read_parsed_from};
//!
//! let debug = read_flag_from(|_| Some("yes".into()), "DEBUG", false);
//! let ttl: u64 = read_parsed_from(|_| None, "JWT_TTL_SECS").unwrap_or(86_400);
//! assert!(debug);
//! assert_eq!(ttl, 86_400);
//! ```

use std::str::FromStr;

use super::error::ConfigError;

/// Reads a value from the real process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Reads a boolean flag using a custom provider function.
///
/// Returns `true` for any of the following case-insensitive values:
/// `"1"`, `"true"`, `"yes"`, `"on"`. Surrounding quotes are ignored.
pub fn read_flag_from<F>(provider: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match provider(name) {
        Some(v) => {
            let s = v.trim().trim_matches(|c| c == '"' || c == '\'');
            matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        }
        None => default,
    }
}

/// Parses a trimmed value. Unset and unparsable values are both `None`;
/// the latter is logged so a typo does not silently fall back.
pub fn read_parsed_from<T, F>(provider: F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = provider(name)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable value");
            None
        }
    }
}

/// Reads a trimmed, non-empty string.
pub fn read_string_from<F>(provider: F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    provider(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reads a variable that must be present and non-empty.
///
/// # Errors
/// [`ConfigError::Missing`] when the variable is unset or blank.
pub fn require_from<F>(provider: F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    read_string_from(provider, name).ok_or(ConfigError::Missing(name))
}
