//! Password hashing with bcrypt.

use anyhow::{Context, Result};

/// Cost used for newly registered accounts.
pub const DEFAULT_COST: u32 = 10;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hashes and checks user passwords.
///
/// The cost is configurable so tests can run with bcrypt's minimum.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).context("bcrypt hash failed")
    }

    /// Returns `false` for a wrong password *and* for an unparsable hash;
    /// a corrupt row must never let a login through.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }
}
