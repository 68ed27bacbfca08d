use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{test_password, TestContext};

async fn user_with_two_factor(ctx: &TestContext, username: &str) -> String {
    let (email, token) = ctx.signed_in_user(username).await;

    let response = ctx
        .server
        .patch("/auth/settings")
        .authorization_bearer(&token)
        .json(&json!({ "two_factor_enabled": true }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], "Settings Updated!");
    assert_eq!(body["user"]["two_factor_enabled"], true);

    email
}

#[tokio::test]
async fn login_asks_for_code_then_accepts_it() {
    let ctx = TestContext::new().await;
    let email = user_with_two_factor(&ctx, "guarded").await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["two_factor"], true);
    assert!(body.get("access_token").is_none());

    let code = ctx.mailed_code(&email);
    assert_eq!(code.len(), 6);

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password(), "code": &code }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body.get("access_token").is_some());

    // the code is consumed by the successful login
    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password(), "code": &code }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_code_is_rejected() {
    let ctx = TestContext::new().await;
    let email = user_with_two_factor(&ctx, "guarded_two").await;

    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status_ok();

    let code = ctx.mailed_code(&email);
    let wrong = if code == "123456" { "654321" } else { "123456" };

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password(), "code": wrong }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid code!");
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let ctx = TestContext::new().await;
    let email = user_with_two_factor(&ctx, "guarded_three").await;

    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status_ok();

    let code = ctx.mailed_code(&email);

    sqlx::query("UPDATE two_factor_tokens SET expires_at = ? WHERE email = ?")
        .bind(Utc::now() - Duration::minutes(10))
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password(), "code": &code }))
        .await;

    response.assert_status(StatusCode::GONE);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Code expired!");
}

#[tokio::test]
async fn code_is_discarded_after_repeated_wrong_guesses() {
    let ctx = TestContext::new().await;
    let email = user_with_two_factor(&ctx, "guessed").await;

    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status_ok();

    let code = ctx.mailed_code(&email);
    let wrong = if code == "123456" { "654321" } else { "123456" };

    for attempt in 1..=5 {
        let response = ctx
            .server
            .post("/auth/login")
            .json(&json!({ "email": &email, "password": test_password(), "code": wrong }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = response.json();
        let expected = if attempt < 5 {
            "Invalid code!"
        } else {
            "Too many attempts! Sign in again for a new code."
        };
        assert_eq!(body["error"], expected);
    }

    // the real code no longer works
    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password(), "code": &code }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // a fresh sign in mails a new code that does
    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status_ok();

    let fresh = ctx.mailed_code(&email);
    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password(), "code": &fresh }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body.get("access_token").is_some());
}
