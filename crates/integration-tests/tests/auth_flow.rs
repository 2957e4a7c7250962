//! End-to-end authentication flows.

use axum::http::StatusCode;
use serde_json::json;

use helpdesk_integration_tests::TestContext;

#[tokio::test]
async fn sign_up_then_sign_in_round_trip() {
    let ctx = TestContext::new();

    let (status, body) = ctx.sign_up("Ada", "ada@x.com", "hunter2hunter2", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["access_token"].as_str().expect("token").is_empty());
    assert_eq!(body["user"]["email"], "ada@x.com");
    assert_eq!(body["user"]["role"], "user");
    // The password never appears in the response.
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/signin",
            None,
            Some(&json!({"email": "ada@x.com", "password": "hunter2hunter2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@x.com");
}

#[tokio::test]
async fn sign_up_with_role_is_honored() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .sign_up("Root", "root@x.com", "hunter2hunter2", Some("admin"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let ctx = TestContext::new();
    ctx.token_for("Ada", "ada@x.com", "hunter2hunter2", None).await;

    let (status, body) = ctx
        .sign_up("Imposter", "ada@x.com", "other-password", None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email already exists");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    ctx.token_for("Ada", "ada@x.com", "hunter2hunter2", None).await;

    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/signin",
            None,
            Some(&json!({"email": "ada@x.com", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/signin",
            None,
            Some(&json!({"email": "ghost@x.com", "password": "whatever"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .sign_up("Ada", "not-an-email", "hunter2hunter2", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoints_are_public() {
    let ctx = TestContext::new();

    let (status, _) = ctx.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.request("GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
