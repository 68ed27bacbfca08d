use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestContext;

#[tokio::test]
async fn details_update_only_provided_fields() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("detailed").await;

    let response = ctx
        .server
        .patch("/profile/details")
        .authorization_bearer(&token)
        .json(&json!({
            "biography": "Building things",
            "location": "Lisbon",
            "contact_email": "hello@example.com"
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], "Saved! ✅");
    assert_eq!(body["page"]["biography"], "Building things");

    let body: serde_json::Value = ctx
        .server
        .patch("/profile/details")
        .authorization_bearer(&token)
        .json(&json!({ "location": "", "name": "Renamed" }))
        .await
        .json();

    assert_eq!(body["page"]["biography"], "Building things");
    assert!(body["page"]["location"].is_null());
    assert_eq!(body["page"]["contact_email"], "hello@example.com");

    let body: serde_json::Value = ctx.server.get("/u/detailed").await.json();
    assert_eq!(body["user"]["name"], "Renamed");
}

#[tokio::test]
async fn details_are_validated() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("validated").await;

    let response = ctx
        .server
        .patch("/profile/details")
        .authorization_bearer(&token)
        .json(&json!({
            "biography": "x".repeat(201),
            "location": "y".repeat(51),
            "contact_email": "nope"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert!(body["fields"].get("biography").is_some());
    assert!(body["fields"].get("location").is_some());
    assert!(body["fields"].get("contact_email").is_some());
}

#[tokio::test]
async fn social_links_upsert_delete_and_skip() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("linked").await;

    ctx.server
        .put("/profile/social-links")
        .authorization_bearer(&token)
        .json(&json!({ "github": "octocat", "x": "linked_dev" }))
        .await
        .assert_status_ok();

    let body: serde_json::Value = ctx
        .server
        .put("/profile/social-links")
        .authorization_bearer(&token)
        .json(&json!({ "github": "octo-cat", "x": "", "youtube": "linkedtube" }))
        .await
        .json();

    let links = body["page"]["social_media_links"].as_array().unwrap();
    let platforms: Vec<&str> = links.iter().map(|l| l["platform"].as_str().unwrap()).collect();
    assert_eq!(platforms, vec!["github", "youtube"]);
    assert_eq!(links[0]["username"], "octo-cat");

    // absent platforms stay untouched
    let body: serde_json::Value = ctx
        .server
        .put("/profile/social-links")
        .authorization_bearer(&token)
        .json(&json!({ "dribbble": "linked" }))
        .await
        .json();
    assert_eq!(body["page"]["social_media_links"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn social_links_follow_platform_rules() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("rule_follower").await;

    let response = ctx
        .server
        .put("/profile/social-links")
        .authorization_bearer(&token)
        .json(&json!({ "instagram": "ends.with.dot.", "github": "trailing-" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["fields"]["instagram"][0], "Invalid Instagram username");
    assert_eq!(body["fields"]["github"][0], "Invalid GitHub username");
}

#[tokio::test]
async fn style_changes_are_partial() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("stylish").await;

    let body: serde_json::Value = ctx
        .server
        .patch("/profile/style")
        .authorization_bearer(&token)
        .json(&json!({ "background_style": "plum" }))
        .await
        .json();
    assert_eq!(body["page"]["background_style"], "plum");
    assert_eq!(body["page"]["project_cards_style"], "grid");

    let body: serde_json::Value = ctx
        .server
        .patch("/profile/style")
        .authorization_bearer(&token)
        .json(&json!({ "project_cards_style": "list", "social_links_style": "ghost" }))
        .await
        .json();
    assert_eq!(body["page"]["background_style"], "plum");
    assert_eq!(body["page"]["project_cards_style"], "list");
    assert_eq!(body["page"]["social_links_style"], "ghost");
}

#[tokio::test]
async fn unknown_style_is_rejected() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("unstyled").await;

    ctx.server
        .patch("/profile/style")
        .authorization_bearer(&token)
        .json(&json!({ "background_style": "neon" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
