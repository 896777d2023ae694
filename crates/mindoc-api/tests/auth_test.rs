//! Login and token handling integration tests.
//!
//! Run with: `cargo test -p mindoc-api --test auth_test`

mod helpers;

use helpers::{api_path, login, setup_test_app, ADMIN_PASSWORD, USER_PASSWORD};
use serde_json::{json, Value};

#[tokio::test]
async fn test_login_returns_usable_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let token = body["token"].as_str().expect("token missing");
    assert!(!token.is_empty());
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
    // Password material never appears in the response.
    assert!(body["user"].get("password_hash").is_none());

    let response = client
        .get(&api_path("/users"))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": "admin", "password": "not-the-password" }))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let app = setup_test_app().await;
    let client = app.client();

    let wrong_password = client
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": "admin", "password": "not-the-password" }))
        .await;
    let unknown_user = client
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": "nobody", "password": "not-the-password" }))
        .await;

    assert_eq!(wrong_password.status_code(), 401);
    assert_eq!(unknown_user.status_code(), 401);
    let a: Value = wrong_password.json();
    let b: Value = unknown_user.json();
    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
async fn test_empty_credentials_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": "", "password": "" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/documents")).await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/documents"))
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_token_of_deleted_user_still_carries_identity() {
    // Tokens are self-contained; deleting the user does not invalidate
    // tokens already issued, it only blocks future logins.
    let app = setup_test_app().await;
    let client = app.client();

    let (admin_token, _) = login(client, "admin", ADMIN_PASSWORD).await;
    let (user_token, user_id) = login(client, "user", USER_PASSWORD).await;

    let response = client
        .delete(&api_path(&format!("/users/{}", user_id)))
        .add_header("Authorization", format!("Bearer {}", admin_token))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = client
        .post(&api_path("/auth/login"))
        .json(&json!({ "username": "user", "password": USER_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = client
        .get(&api_path("/documents"))
        .add_header("Authorization", format!("Bearer {}", user_token))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_healthz_is_public() {
    let app = setup_test_app().await;

    let response = app.client().get("/healthz").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["openapi"].as_str().is_some());
    assert!(body["paths"]["/api/v1/documents"].is_object());
}
