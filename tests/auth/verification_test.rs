use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{test_email, TestContext};

#[tokio::test]
async fn verification_token_is_single_use() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, None).await;
    let token = ctx.mailed_token(&email);

    let response = ctx
        .server
        .post("/auth/new-verification")
        .json(&json!({ "token": &token }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], "Email verified!");

    let response = ctx
        .server
        .post("/auth/new-verification")
        .json(&json!({ "token": &token }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Token does not exist!");
}

#[tokio::test]
async fn expired_verification_token_is_rejected() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, None).await;
    let token = ctx.mailed_token(&email);

    sqlx::query("UPDATE verification_tokens SET expires_at = ? WHERE token = ?")
        .bind(Utc::now() - Duration::hours(2))
        .bind(&token)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .server
        .post("/auth/new-verification")
        .json(&json!({ "token": &token }))
        .await;

    response.assert_status(StatusCode::GONE);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Token has expired!");
}

#[tokio::test]
async fn resend_reuses_a_live_token() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, None).await;
    let first = ctx.mailed_token(&email);

    let response = ctx
        .server
        .post("/auth/verification")
        .json(&json!({ "email": &email }))
        .await;
    response.assert_status_ok();

    assert_eq!(ctx.mailed_token(&email), first);
}

#[tokio::test]
async fn resend_for_unknown_email_returns_not_found() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/auth/verification")
        .json(&json!({ "email": test_email() }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_token_returns_not_found() {
    let ctx = TestContext::new().await;

    ctx.server
        .post("/auth/new-verification")
        .json(&json!({ "token": "00000000-0000-0000-0000-000000000000" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
