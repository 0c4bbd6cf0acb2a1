//! Integration tests for registration, login, and token refresh
//!
//! These verify the authentication surface end-to-end against a real
//! database: role assignment and coercion at registration, the uniform
//! invalid-credentials failure, and the access/refresh token lifecycle.

mod common;

use axum::http::StatusCode;
use common::{json_request, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_register_defaults_to_user_role() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("alice");

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "username": username, "password": "pw1" })),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["roles"], json!(["user"]));
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_with_admin_role() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("bob");

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "username": username, "password": "pw2", "role": "admin" })),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["roles"], json!(["admin"]));
}

#[tokio::test]
async fn test_register_unknown_role_coerced_to_user() {
    let ctx = TestContext::new().await.unwrap();

    for bogus_role in ["superuser", "Admin", ""] {
        let username = TestContext::unique_username("coerced");
        let (status, body) = ctx
            .send_json(json_request(
                "POST",
                "/v1/auth/register",
                None,
                Some(json!({ "username": username, "password": "pw", "role": bogus_role })),
            ))
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roles"], json!(["user"]), "role {:?}", bogus_role);
    }
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("dupe");
    let payload = json!({ "username": username, "password": "password123!" });

    let (status, _) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(payload.clone()),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .send_json(json_request("POST", "/v1/auth/register", None, Some(payload)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_register_duplicate_username_with_different_role_still_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("dupe-role");

    let (status, _) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "username": username, "password": "pw" })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "username": username, "password": "pw", "role": "admin" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_missing_fields() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "password": "password123!" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("username").is_some());

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "username": TestContext::unique_username("nopw") })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("password").is_some());
}

#[tokio::test]
async fn test_register_blank_username() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "username": "", "password": "pw" })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("username").is_some());
}

#[tokio::test]
async fn test_login_returns_tokens() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("login");

    ctx.send_json(json_request(
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    ))
    .await;

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["token"], body["access_token"]);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("uniform");

    ctx.send_json(json_request(
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    ))
    .await;

    // Wrong password, unknown username, missing password, missing username:
    // all must produce the exact same status and body.
    let attempts = vec![
        json!({ "username": username, "password": "wrong" }),
        json!({ "username": TestContext::unique_username("ghost"), "password": "password123" }),
        json!({ "username": username }),
        json!({ "password": "password123" }),
        json!({}),
    ];

    for attempt in attempts {
        let (status, body) = ctx
            .send_json(json_request(
                "POST",
                "/v1/auth/login",
                None,
                Some(attempt.clone()),
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "attempt {}", attempt);
        assert_eq!(
            body,
            json!({ "error": "Invalid credentials" }),
            "attempt {}",
            attempt
        );
    }
}

#[tokio::test]
async fn test_login_token_authenticates_requests() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("bearer");

    ctx.send_json(json_request(
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    ))
    .await;

    let (_, login) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        ))
        .await;
    let token = login["token"].as_str().unwrap();

    let (status, body) = ctx
        .send_json(json_request("GET", "/v1/tasks", Some(token), None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("refresh");

    ctx.send_json(json_request(
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    ))
    .await;

    let (_, login) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        ))
        .await;

    let (status, body) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": login["refresh_token"] })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let new_access = body["access_token"].as_str().unwrap();

    let (status, _) = ctx
        .send_json(json_request("GET", "/v1/tasks", Some(new_access), None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token_and_garbage() {
    let ctx = TestContext::new().await.unwrap();
    let username = TestContext::unique_username("badrefresh");

    ctx.send_json(json_request(
        "POST",
        "/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    ))
    .await;

    let (_, login) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        ))
        .await;

    // An access token is not a refresh token
    let (status, _) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": login["access_token"] })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .send_json(json_request(
            "POST",
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": "not.a.token" })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
