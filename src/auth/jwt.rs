//! # Token service (JWT)
//!
//! Issues and verifies the HS256 tokens that carry a [`Principal`].
//! It does **not** access environment variables directly; the secret,
//! lifetime and clock-skew tolerance come from
//! [`AuthConfig`](crate::config::auth::AuthConfig).
//!
//! ## Design principles
//! - No dependency on `std::env`
//! - No global state
//! - Time comes from a [`Clock`], so expiry is testable without sleeping
//!
//! ## Timestamp checks
//! `exp` and `nbf` are compared against [`Clock::now`] with a symmetric
//! leeway. The library's own time validation is switched off so the
//! injected clock is the only source of "now".

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::auth::principal::{Principal, Role};
use crate::time::Clock;

/// JWT claims stored inside the token payload.
///
/// Timestamps are UNIX seconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub id: String,
    pub email: String,
    pub role: Role,
    /// Issued at.
    pub iat: i64,
    /// Not before.
    pub nbf: i64,
    /// Expires at.
    pub exp: i64,
}

impl Claims {
    /// Drops the timing metadata and returns the identity part.
    pub fn principal(&self) -> Principal {
        Principal::new(self.id.clone(), self.email.clone(), self.role)
    }
}

/// Signs and verifies session tokens.
///
/// Cheap to share behind an `Arc`; all fields are immutable after startup.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    leeway_secs: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service signing with `secret`.
    ///
    /// ## Example
    /// ```
    /// use std::sync::Arc;
    /// use chrono::Duration;
    /// use khanom_shop::auth::{Principal, Role, TokenService};
    /// use khanom_shop::time::SystemClock;
    ///
    /// let tokens = TokenService::new(b"doc-secret", Duration::hours(24), 60, Arc::new(SystemClock));
    /// let token = tokens.issue(&Principal::new("1", "a@example.com", Role::User)).unwrap();
    /// assert_eq!(tokens.verify(&token).unwrap().id, "1");
    /// ```
    pub fn new(secret: &[u8], ttl: Duration, leeway_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            leeway_secs: i64::try_from(leeway_secs).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Token lifetime, also used as the auth cookie `Max-Age`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `principal`, valid from now until now + ttl.
    ///
    /// ## Errors
    /// [`AuthError::TokenIssue`] if encoding fails.
    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let now = self.clock.now().timestamp();
        let claims = Claims {
            id: principal.id.clone(),
            email: principal.email.clone(),
            role: principal.role,
            iat: now,
            nbf: now,
            exp: now + self.ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Validates signature and timing, then returns the claims.
    ///
    /// ## Errors
    /// - [`AuthError::InvalidSignature`] if the signature does not match
    /// - [`AuthError::Expired`] if `exp` is older than the leeway allows
    /// - [`AuthError::MalformedToken`] for undecodable tokens, a wrong
    ///   algorithm, or an `nbf` still in the future
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if claims.exp.saturating_add(self.leeway_secs) < now {
            return Err(AuthError::Expired);
        }
        if claims.nbf.saturating_sub(self.leeway_secs) > now {
            return Err(AuthError::MalformedToken);
        }

        Ok(claims)
    }
}
