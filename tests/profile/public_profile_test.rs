use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestContext;

#[tokio::test]
async fn unknown_username_returns_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/u/nobody_here").await;

    response.assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "User not found!");
}

#[tokio::test]
async fn new_page_has_default_styles() {
    let ctx = TestContext::new().await;
    ctx.signed_in_user("fresh_page").await;

    let response = ctx.server.get("/u/fresh_page").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["username"], "fresh_page");
    assert!(body["user"].get("email").is_none());
    assert_eq!(body["page"]["background_style"], "ruby");
    assert_eq!(body["page"]["project_cards_style"], "grid");
    assert_eq!(body["page"]["social_links_style"], "fill");
    assert_eq!(body["page"]["social_media_links"], json!([]));
    assert_eq!(body["projects"], json!([]));
}

#[tokio::test]
async fn viewing_a_profile_without_page_does_not_create_one() {
    let ctx = TestContext::new().await;
    ctx.signed_in_user("pageless").await;

    sqlx::query(
        "DELETE FROM user_pages WHERE user_id = (SELECT id FROM users WHERE username = ?)",
    )
    .bind("pageless")
    .execute(&ctx.db)
    .await
    .unwrap();

    let response = ctx.server.get("/u/pageless").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["page"]["background_style"], "ruby");
    assert_eq!(body["page"]["social_media_links"], json!([]));
    assert_eq!(body["projects"], json!([]));

    let (pages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_pages")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(pages, 0);
}

#[tokio::test]
async fn public_page_lists_links_and_projects_in_order() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("showcase").await;

    ctx.server
        .put("/profile/social-links")
        .authorization_bearer(&token)
        .json(&json!({ "linkedin": "show-case", "github": "showcase" }))
        .await
        .assert_status_ok();

    ctx.create_project(&token, "First").await;
    ctx.create_project(&token, "Second").await;

    let body: serde_json::Value = ctx.server.get("/u/showcase").await.json();

    let links = body["page"]["social_media_links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["platform"], "github");
    assert_eq!(links[0]["url"], "https://github.com/showcase");
    assert_eq!(links[1]["platform"], "linkedin");

    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects[0]["name"], "First");
    assert_eq!(projects[1]["name"], "Second");
    assert_eq!(projects[0]["category_name"], "✍️ Productivity");
    assert_eq!(projects[0]["status_name"], "🟢 Active");
}

#[tokio::test]
async fn panel_requires_a_session() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/profile")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn panel_returns_owner_view() {
    let ctx = TestContext::new().await;
    let (email, token) = ctx.signed_in_user("panel_owner").await;

    let response = ctx.server.get("/profile").authorization_bearer(&token).await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["page"]["id"].is_string());
}
