//! `/api/auth/*`: registration, login, logout and the current identity.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::credential::{auth_cookie, removal_cookie};
use crate::auth::password::MIN_PASSWORD_LEN;
use crate::auth::{Principal, Role};
use crate::error::{ApiError, is_duplicate_key};
use crate::model::{User, new_id};
use crate::web::api::Message;
use crate::web::csrf::CSRF_COOKIE_NAME;
use crate::web::extract::{ApiJson, blocking};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: User,
}

fn present(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) =
        (present(req.name), present(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request("Missing required fields"));
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let users = state.store.users.clone();
    let hasher = state.hasher;
    let now = state.now();

    let user = blocking(move || {
        if users.find_by_email(&email)?.is_some() {
            return Ok(None);
        }
        let user = User {
            id: new_id(),
            name,
            email,
            password_hash: hasher.hash(&password)?,
            role: Role::User,
            created_at: now,
        };
        match users.insert(&user) {
            Ok(()) => Ok(Some(user)),
            // Lost a race with a concurrent registration for the same email.
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await?
    .ok_or_else(|| ApiError::bad_request("Email already in use"))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (Some(email), Some(password)) =
        (present(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let users = state.store.users.clone();
    let hasher = state.hasher;
    let user = blocking(move || {
        let user = users.find_by_email(&email)?;
        Ok(user.filter(|u| hasher.verify(&password, &u.password_hash)))
    })
    .await?;

    let Some(user) = user else {
        tracing::info!("login rejected");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let token = state.tokens.issue(&user.principal())?;
    let jar = jar.add(auth_cookie(
        &state.session.cookies.auth,
        &token,
        state.tokens.ttl().num_seconds(),
        state.session.cookie_secure,
    ));

    tracing::info!(user_id = %user.id, "user logged in");

    Ok((jar, Json(LoginResponse { user, token })))
}

/// Clears every cookie that can carry a credential, plus the CSRF cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Message>) {
    let cookies = &state.session.cookies;
    let mut jar = jar
        .add(removal_cookie(&cookies.auth))
        .add(removal_cookie(CSRF_COOKIE_NAME));
    if let Some(session) = &cookies.session {
        jar = jar.add(removal_cookie(session));
    }

    (jar, Json(Message::new("Logged out successfully")))
}

pub async fn me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn registered(state: &AppState, email: &str) -> Result<User, ApiError> {
        register(
            State(state.clone()),
            ApiJson(RegisterRequest {
                name: Some("Somchai".into()),
                email: Some(email.into()),
                password: Some("secret1".into()),
            }),
        )
        .await
        .map(|(_, Json(body))| body.user)
    }

    #[tokio::test]
    async fn register_creates_a_user_account() {
        let state = AppState::for_tests();

        let user = registered(&state, "somchai@example.com").await.unwrap();

        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "secret1");
        assert!(
            state
                .store
                .users
                .find_by_email("somchai@example.com")
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_short_passwords() {
        let state = AppState::for_tests();
        registered(&state, "dup@example.com").await.unwrap();

        let err = registered(&state, "dup@example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "Email already in use");

        let err = register(
            State(state),
            ApiJson(RegisterRequest {
                name: Some("n".into()),
                email: Some("short@example.com".into()),
                password: Some("12345".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[tokio::test]
    async fn register_maps_a_late_duplicate_insert_to_400() {
        use crate::store::{MemoryStore, testing::StaleLookups};
        use std::sync::Arc;

        let mut state = AppState::for_tests();
        state.store.users = Arc::new(StaleLookups(Arc::new(MemoryStore::new())));
        registered(&state, "race@example.com").await.unwrap();

        let err = registered(&state, "race@example.com").await.unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Email already in use");
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let err = register(State(AppState::for_tests()), ApiJson(RegisterRequest::default()))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[tokio::test]
    async fn login_sets_cookie_and_returns_verifiable_token() {
        let state = AppState::for_tests();
        registered(&state, "login@example.com").await.unwrap();

        let (jar, Json(body)) = login(
            State(state.clone()),
            CookieJar::new(),
            ApiJson(LoginRequest {
                email: Some("login@example.com".into()),
                password: Some("secret1".into()),
            }),
        )
        .await
        .unwrap();

        let cookie = jar.get("auth-token").expect("auth cookie");
        assert_eq!(cookie.value(), body.token);
        assert_eq!(cookie.http_only(), Some(true));
        let claims = state.tokens.verify(&body.token).unwrap();
        assert_eq!(claims.id, body.user.id);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let state = AppState::for_tests();
        registered(&state, "who@example.com").await.unwrap();

        for (email, password) in [("who@example.com", "wrong-pass"), ("nobody@example.com", "secret1")] {
            let err = login(
                State(state.clone()),
                CookieJar::new(),
                ApiJson(LoginRequest {
                    email: Some(email.into()),
                    password: Some(password.into()),
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        }
    }

    #[tokio::test]
    async fn logout_removes_credential_cookies() {
        let (jar, Json(body)) = logout(State(AppState::for_tests()), CookieJar::new()).await;

        assert_eq!(body.message, "Logged out successfully");
        for name in ["auth-token", CSRF_COOKIE_NAME] {
            let cookie = jar.get(name).expect("removal cookie");
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        }
    }
}
