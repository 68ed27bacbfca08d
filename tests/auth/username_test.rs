use axum::http::{header, HeaderValue, StatusCode};
use serde_json::json;

use crate::common::{test_email, test_password, TestContext};

fn cookie_pair(set_cookie: &HeaderValue) -> String {
    set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn check_reports_availability() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/auth/username/check")
        .add_query_param("username", "fresh_name")
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["available"], true);

    ctx.register(&test_email(), Some("fresh_name")).await;

    let response = ctx
        .server
        .get("/auth/username/check")
        .add_query_param("username", "fresh_name")
        .await;

    let body: serde_json::Value = response.json();
    assert_eq!(body["available"], false);
    assert_eq!(body["message"], "Username already in use!");
}

#[tokio::test]
async fn check_rejects_malformed_usernames() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/auth/username/check")
        .add_query_param("username", "ab")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_cookie_carries_username_into_registration() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/username/session")
        .json(&json!({ "username": "picked_early" }))
        .await;
    response.assert_status_ok();

    let cookie = cookie_pair(&response.header(header::SET_COOKIE));
    assert!(cookie.starts_with("devpage.username="));

    let response = ctx
        .server
        .get("/auth/username/session")
        .add_header(header::COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "picked_early");

    let email = test_email();
    let response = ctx
        .server
        .post("/auth/register")
        .add_header(header::COOKIE, HeaderValue::from_str(&cookie).unwrap())
        .json(&json!({
            "email": &email,
            "password": test_password(),
            "name": "Early Bird"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    // registration clears the cookie
    let cleared = response.header(header::SET_COOKIE);
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));

    ctx.verify(&email).await;
    let token = ctx.login(&email).await;

    let body: serde_json::Value = ctx
        .server
        .get("/auth/me")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(body["user"]["username"], "picked_early");
}

#[tokio::test]
async fn tampered_session_cookie_is_ignored() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/auth/username/session")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("devpage.username=YWRtaW4.deadbeef"),
        )
        .await;

    let body: serde_json::Value = response.json();
    assert!(body["username"].is_null());
}

#[tokio::test]
async fn username_can_be_set_once() {
    let ctx = TestContext::new().await;
    let email = test_email();
    ctx.register(&email, None).await;
    ctx.verify(&email).await;
    let token = ctx.login(&email).await;

    let response = ctx
        .server
        .post("/auth/username")
        .authorization_bearer(&token)
        .json(&json!({ "username": "late_pick" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["username"], "late_pick");

    let response = ctx
        .server
        .post("/auth/username")
        .authorization_bearer(&token)
        .json(&json!({ "username": "another_pick" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "You already have a username!");
}

#[tokio::test]
async fn username_taken_by_someone_else_is_refused() {
    let ctx = TestContext::new().await;
    ctx.register(&test_email(), Some("first_come")).await;

    let email = test_email();
    ctx.register(&email, None).await;
    ctx.verify(&email).await;
    let token = ctx.login(&email).await;

    let response = ctx
        .server
        .post("/auth/username")
        .authorization_bearer(&token)
        .json(&json!({ "username": "first_come" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Username already exists!");
}
