use axum::http::StatusCode;
use thiserror::Error;

/// Reasons a request fails authentication or authorization.
///
/// None of these are fatal: the gate turns each one into a single 401/403
/// response or a redirect, and the next request starts from scratch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credential presented")]
    NoCredential,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed or not yet valid")]
    MalformedToken,

    #[error("insufficient role for this resource")]
    InsufficientRole,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("failed to issue token: {0}")]
    TokenIssue(String),
}

impl AuthError {
    /// HTTP status used when this error is reported to an API client.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::TokenIssue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message returned in the `{"message": ...}` body.
    ///
    /// Verification failures share one message so clients cannot tell
    /// which check rejected a token.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::NoCredential | AuthError::MalformedRequest(_) => "Unauthorized",
            AuthError::InvalidSignature | AuthError::Expired | AuthError::MalformedToken => {
                "Invalid or expired token"
            }
            AuthError::InsufficientRole => "Forbidden: Admin access required",
            AuthError::TokenIssue(_) => "An error occurred during authentication",
        }
    }

    /// `true` for errors produced while checking a presented token.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidSignature | AuthError::Expired | AuthError::MalformedToken
        )
    }
}
