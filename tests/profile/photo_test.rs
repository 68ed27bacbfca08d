use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};

use crate::common::{png_form as image_form, TestContext, PNG};

fn key_of(url: &str) -> String {
    url.rsplit('/').next().unwrap().to_string()
}

#[tokio::test]
async fn photo_is_stored_served_and_replaced() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("photogenic").await;

    let response = ctx
        .server
        .post("/profile/photo")
        .authorization_bearer(&token)
        .multipart(image_form())
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let first_key = key_of(body["image"].as_str().unwrap());
    assert!(ctx.files.path().join(&first_key).exists());

    let served = ctx.server.get(&format!("/files/{}", first_key)).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), PNG);

    let body: serde_json::Value = ctx
        .server
        .post("/profile/photo")
        .authorization_bearer(&token)
        .multipart(image_form())
        .await
        .json();
    let second_key = key_of(body["image"].as_str().unwrap());

    assert_ne!(first_key, second_key);
    assert!(!ctx.files.path().join(&first_key).exists());
    assert!(ctx.files.path().join(&second_key).exists());
}

#[tokio::test]
async fn photo_can_be_deleted_once() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("camera_shy").await;

    let body: serde_json::Value = ctx
        .server
        .post("/profile/photo")
        .authorization_bearer(&token)
        .multipart(image_form())
        .await
        .json();
    let key = key_of(body["image"].as_str().unwrap());

    let response = ctx
        .server
        .delete("/profile/photo")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    assert!(!ctx.files.path().join(&key).exists());

    let body: serde_json::Value = ctx.server.get("/u/camera_shy").await.json();
    assert!(body["user"]["image"].is_null());

    let response = ctx
        .server
        .delete("/profile/photo")
        .authorization_bearer(&token)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No image to delete!");
}

#[tokio::test]
async fn non_images_are_refused() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("text_sender").await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );

    let response = ctx
        .server
        .post("/profile/photo")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["fields"]["file"][0], "Only images are allowed!");
}

#[tokio::test]
async fn uploads_endpoint_returns_url_and_key() {
    let ctx = TestContext::new().await;
    let (_, token) = ctx.signed_in_user("uploader").await;

    ctx.server
        .post("/uploads")
        .multipart(image_form())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = ctx
        .server
        .post("/uploads")
        .authorization_bearer(&token)
        .multipart(image_form())
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    let key = body["key"].as_str().unwrap().to_string();
    assert!(body["url"].as_str().unwrap().ends_with(&key));

    ctx.server
        .delete(&format!("/uploads/{}", key))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(!ctx.files.path().join(&key).exists());
}

#[tokio::test]
async fn files_used_by_another_user_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    let (_, owner) = ctx.signed_in_user("portrait").await;
    let (_, other) = ctx.signed_in_user("eraser").await;

    let photo = ctx.upload_photo(&owner).await;

    let project = ctx.create_project(&owner, "Cover").await;
    let body: serde_json::Value = ctx
        .server
        .post(&format!("/projects/{}/image", project["id"].as_str().unwrap()))
        .authorization_bearer(&owner)
        .multipart(image_form())
        .await
        .json();
    let cover = body["project"]["image"].as_str().unwrap().to_string();

    for url in [&photo, &cover] {
        let response = ctx
            .server
            .delete(&format!("/uploads/{}", key_of(url)))
            .authorization_bearer(&other)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);

        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "File not found!");
        assert!(ctx.stored(url));
    }

    ctx.server
        .get(&format!("/files/{}", key_of(&photo)))
        .await
        .assert_status_ok();
}
