use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};

use crate::common::TestContext;

#[tokio::test]
async fn delete_compacts_remaining_indices() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("pruner").await;

    let first = ctx.create_project(&token, "First").await;
    let second = ctx.create_project(&token, "Second").await;
    ctx.create_project(&token, "Third").await;

    ctx.server
        .delete(&format!("/projects/{}", first["id"].as_str().unwrap()))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let body: serde_json::Value = ctx.server.get("/u/pruner/projects").await.json();
    let projects = body["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0]["id"], second["id"]);
    assert_eq!(projects[0]["sort_index"], 0);
    assert_eq!(projects[1]["sort_index"], 1);

    // appending after a delete continues from the compacted end
    let fourth = ctx.create_project(&token, "Fourth").await;
    assert_eq!(fourth["sort_index"], 2);
}

#[tokio::test]
async fn delete_removes_the_project_image() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("illustrated").await;
    let project = ctx.create_project(&token, "Pictured").await;
    let id = project["id"].as_str().unwrap();

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0x47, 0x49, 0x46, 0x38])
            .file_name("cover.gif")
            .mime_type("image/gif"),
    );

    let body: serde_json::Value = ctx
        .server
        .post(&format!("/projects/{}/image", id))
        .authorization_bearer(&token)
        .multipart(form)
        .await
        .json();

    let image = body["project"]["image"].as_str().unwrap().to_string();
    let key = image.rsplit('/').next().unwrap().to_string();
    assert!(key.ends_with(".gif"));
    assert!(ctx.files.path().join(&key).exists());

    ctx.server
        .delete(&format!("/projects/{}", id))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    assert!(!ctx.files.path().join(&key).exists());
}

#[tokio::test]
async fn other_users_cannot_delete() {
    let ctx = TestContext::new().await;
    let (_, owner) = ctx.signed_in_user("keeper").await;
    let (_, intruder) = ctx.signed_in_user("vandal").await;
    let project = ctx.create_project(&owner, "Kept").await;

    ctx.server
        .delete(&format!("/projects/{}", project["id"].as_str().unwrap()))
        .authorization_bearer(&intruder)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = ctx.server.get("/u/keeper/projects").await.json();
    assert_eq!(body["projects"].as_array().unwrap().len(), 1);
}
