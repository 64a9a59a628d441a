//! # CSRF Configuration
//!
//! Secret key and cookie flags for the double-submit CSRF check applied to
//! cookie-authenticated API writes.
//!
//! - `CSRF_SECRET`: string the 32-byte HMAC key is derived from. When unset,
//!   a random key is generated and the check is **disabled**.
//! - `CSRF_COOKIE_SECURE`: `Secure` cookie flag (default: `true`)
//! - `CSRF_COOKIE_HTTPONLY`: `HttpOnly` cookie flag (default: `true`)

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::env::{read_flag_from, read_string_from};

/// Configuration for CSRF protection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrfConfig {
    pub secret: [u8; 32],
    pub enabled: bool,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
}

impl CsrfConfig {
    /// Loads configuration using a custom key provider.
    pub fn from_env_with<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = read_string_from(&get, "CSRF_SECRET");
        let secret = match explicit.as_deref() {
            Some(s) => derive_secret_from_string(s),
            None => random_secret(),
        };

        Self {
            secret,
            enabled: explicit.is_some(),
            cookie_secure: read_flag_from(&get, "CSRF_COOKIE_SECURE", true),
            cookie_http_only: read_flag_from(&get, "CSRF_COOKIE_HTTPONLY", true),
        }
    }

    /// A disabled configuration with a random key.
    pub fn disabled() -> Self {
        Self::from_env_with(|_| None)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Derives a deterministic 32-byte key from a string.
pub fn derive_secret_from_string(s: &str) -> [u8; 32] {
    let digest = Sha256::digest(s.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest[..32]);
    key
}

/// Generates a new random 32-byte key.
pub fn random_secret() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::rng().fill_bytes(&mut key);
    key
}
