//! Request extractors for handlers behind the authorization gate.

use axum::{
    extract::{FromRequest, FromRequestParts, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
};

use crate::auth::{AuthError, Principal};
use crate::error::ApiError;

/// `Json` body whose rejections render as `{"message": ...}` 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AuthError::NoCredential.into())
    }
}

/// A principal holding the `ADMIN` role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_admin() {
            return Err(AuthError::InsufficientRole.into());
        }
        Ok(AdminPrincipal(principal))
    }
}

/// Runs a blocking repository call on tokio's blocking pool.
pub async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?.map_err(ApiError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use axum::http::Request;

    use crate::auth::Role;

    fn parts_with(principal: Option<Principal>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(p) = principal {
            parts.extensions.insert(p);
        }
        parts
    }

    #[tokio::test]
    async fn principal_requires_gate_extension() {
        let mut parts = parts_with(None);

        let err = Principal::from_request_parts(&mut parts, &()).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_principal_checks_role() {
        let mut user = parts_with(Some(Principal::new("u", "u@example.com", Role::User)));
        let err = AdminPrincipal::from_request_parts(&mut user, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let mut admin = parts_with(Some(Principal::new("a", "a@example.com", Role::Admin)));
        let AdminPrincipal(p) = AdminPrincipal::from_request_parts(&mut admin, &())
            .await
            .unwrap();
        assert_eq!(p.id, "a");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let req = Request::post("/")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let err = ApiJson::<serde_json::Value>::from_request(req, &())
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blocking_maps_errors_to_internal() {
        let ok = blocking(|| Ok(7)).await.unwrap();
        assert_eq!(ok, 7);

        let err = blocking::<(), _>(|| Err(anyhow!("db down"))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
