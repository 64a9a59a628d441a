mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use khanom_shop::auth::Role;
use khanom_shop::gate::{Policy, RouteTable, RouteTableError};
use serde_json::json;

use common::{NOW, SECRET, TestApp, auth_cookie, bearer, foreign_token, json_body, location, set_cookies};

#[tokio::test]
async fn user_token_on_admin_api_is_forbidden() {
    let app = TestApp::new();

    let res = app
        .send(
            Request::get("/api/admin/orders/42")
                .header(header::AUTHORIZATION, bearer(&app.token_for(Role::User)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(res).await,
        json!({"message": "Forbidden: Admin access required"})
    );
}

#[tokio::test]
async fn admin_token_reaches_admin_handlers() {
    let app = TestApp::new();
    let token = app.token_for(Role::Admin);

    let res = app
        .send(
            Request::get("/api/admin/orders")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await, json!([]));

    // Past the gate, a missing order is the handler's 404.
    let res = app
        .send(
            Request::get("/api/admin/orders/42")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await, json!({"message": "Order not found"}));
}

#[tokio::test]
async fn admin_page_without_cookie_redirects_to_login() {
    let app = TestApp::new();

    let res = app
        .send(Request::get("/admin/dashboard").body(Body::empty()).unwrap())
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/auth/login?callbackUrl=/admin/dashboard");
}

#[tokio::test]
async fn admin_page_with_user_cookie_goes_to_forbidden_redirect() {
    let app = TestApp::with_env(&[("AUTH_FORBIDDEN_REDIRECT", "/products")]);

    let res = app
        .send(
            Request::get("/admin")
                .header(header::COOKIE, auth_cookie(&app.token_for(Role::User)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/products");
}

#[tokio::test]
async fn admin_page_with_admin_cookie_renders() {
    let app = TestApp::new();

    let res = app
        .send(
            Request::get("/admin/orders")
                .header(header::COOKIE, auth_cookie(&app.token_for(Role::Admin)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_token_is_denied_and_cookie_cleared() {
    let app = TestApp::new();
    // Issued two hours ago with a one hour lifetime: far past the leeway.
    let stale = foreign_token(SECRET.as_bytes(), NOW - 7_200, Role::User);

    let res = app
        .send(
            Request::get("/api/orders")
                .header(header::COOKIE, auth_cookie(&stale))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        set_cookies(&res).iter().any(|c| c.starts_with("auth-token=")),
        "stale auth cookie should be cleared"
    );
    assert_eq!(
        json_body(res).await,
        json!({"message": "Invalid or expired token"})
    );
}

#[tokio::test]
async fn wrong_secret_token_is_denied() {
    let app = TestApp::new();
    let forged = foreign_token(b"some-other-signing-secret-entirely", NOW, Role::Admin);

    let res = app
        .send(
            Request::get("/api/admin/orders")
                .header(header::AUTHORIZATION, bearer(&forged))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&res).is_empty());
}

#[tokio::test]
async fn page_with_bad_token_redirects_and_keeps_query() {
    let app = TestApp::new();

    let res = app
        .send(
            Request::get("/orders/abc?tab=items")
                .header(header::COOKIE, auth_cookie("not.a.jwt"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("/auth/login?callbackUrl=/orders/abc%3Ftab%3Ditems"));
}

#[tokio::test]
async fn json_clients_on_pages_get_json_denials() {
    let app = TestApp::new();

    let res = app
        .send(
            Request::get("/checkout")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await, json!({"message": "Unauthorized"}));
}

#[tokio::test]
async fn public_endpoints_need_no_credential() {
    let app = TestApp::new();

    let res = app
        .send(Request::get("/api/products").body(Body::empty()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .send(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"nobody@example.com","password":"whatever"}"#))
                .unwrap(),
        )
        .await;
    // Reached the handler: a bad login, not a missing credential.
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await, json!({"message": "Invalid credentials"}));

    let res = app
        .send(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"x@example.com"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await, json!({"message": "Missing required fields"}));
}

#[tokio::test]
async fn product_writes_require_admin() {
    let app = TestApp::new();
    let body = r#"{"name":"Khanom Krok","description":"Coconut pancakes","price":4.5,"imageUrl":"krok.jpg"}"#;

    let res = app
        .send(
            Request::post("/api/products")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, bearer(&app.token_for(Role::User)))
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(
            Request::delete("/api/products/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn spoofed_identity_headers_are_ignored() {
    let app = TestApp::new();

    let res = app
        .send(
            Request::get("/api/auth/me")
                .header("x-user-id", "admin-1")
                .header("x-user-role", "ADMIN")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .send(
            Request::get("/api/admin/orders")
                .header(header::AUTHORIZATION, bearer(&app.token_for(Role::User)))
                .header("x-user-role", "ADMIN")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .send(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, bearer(&app.token_for(Role::User)))
                .header("x-user-id", "someone-else")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let me = json_body(res).await;
    assert_eq!(me["id"], "principal-1");
    assert_eq!(me["role"], "USER");
}

#[tokio::test]
async fn unknown_api_paths_default_to_protected() {
    let app = TestApp::new();

    let res = app
        .send(Request::get("/api/reports").body(Body::empty()).unwrap())
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .send(
            Request::get("/api/reports")
                .header(header::AUTHORIZATION, bearer(&app.token_for(Role::User)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[test]
fn conflicting_route_rules_fail_to_build() {
    let err = RouteTable::builder()
        .prefix_for(&[Method::GET], "/api/things", Policy::Public)
        .prefix_for(&[Method::GET, Method::POST], "/api/things", Policy::AdminOnly)
        .build()
        .unwrap_err();

    assert!(matches!(err, RouteTableError::Conflict { .. }));
}

#[test]
fn auth_endpoints_are_not_shadowed_by_api_prefix() {
    let table = RouteTable::storefront().unwrap();

    assert_eq!(table.classify(&Method::POST, "/api/auth/login"), Policy::Public);
    assert_eq!(table.classify(&Method::POST, "/api/auth/register"), Policy::Public);
    assert_eq!(table.classify(&Method::GET, "/api/auth/me"), Policy::Protected);
    assert_eq!(table.classify(&Method::GET, "/api/products/7"), Policy::Public);
    assert_eq!(table.classify(&Method::PUT, "/api/products/7"), Policy::AdminOnly);
    assert_eq!(table.classify(&Method::GET, "/api/productsX"), Policy::Protected);
    assert_eq!(table.classify(&Method::GET, "/about"), Policy::Public);
}
