use thiserror::Error;

/// Startup configuration failures.
///
/// These abort the process at boot; there are no silent fallbacks for
/// required values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("environment variable `{name}` is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
