//! Pure authorization decision.
//!
//! `START → CLASSIFY → ALLOW(public) | EXTRACT → NO_TOKEN → DENY
//!                                           | TOKEN → VERIFY → INVALID → DENY + CLEAR_COOKIE
//!                                                            | VALID → ROLE_CHECK → DENY | ALLOW`

use crate::auth::{AuthError, Credential, Principal, TokenService};
use crate::gate::routes::Policy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// `principal` is `None` only for public routes.
    Allow { principal: Option<Principal> },
    Deny {
        error: AuthError,
        /// Cookie that carried a token which failed verification.
        clear_cookie: Option<String>,
    },
}

impl Decision {
    fn deny(error: AuthError) -> Self {
        Decision::Deny {
            error,
            clear_cookie: None,
        }
    }
}

/// Decides the fate of one request.
///
/// `credential` is the outcome of
/// [`extract_credential`](crate::auth::credential::extract_credential); it
/// is ignored for [`Policy::Public`].
pub fn evaluate(
    policy: Policy,
    credential: Result<Option<Credential>, AuthError>,
    tokens: &TokenService,
) -> Decision {
    if policy == Policy::Public {
        return Decision::Allow { principal: None };
    }

    let credential = match credential {
        Ok(Some(c)) => c,
        Ok(None) => return Decision::deny(AuthError::NoCredential),
        Err(e) => return Decision::deny(e),
    };

    let principal = match tokens.verify(&credential.token) {
        Ok(claims) => claims.principal(),
        Err(error) => {
            let clear_cookie = error
                .is_verification_failure()
                .then(|| credential.source.cookie_name())
                .flatten()
                .map(str::to_string);
            return Decision::Deny { error, clear_cookie };
        }
    };

    if policy == Policy::AdminOnly && !principal.is_admin() {
        return Decision::deny(AuthError::InsufficientRole);
    }

    Decision::Allow {
        principal: Some(principal),
    }
}
