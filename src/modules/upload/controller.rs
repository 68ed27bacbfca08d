use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::CurrentUser;
use crate::services::storage::{self, StoredFile, MAX_IMAGE_BYTES};
use crate::AppState;
use super::crud::UploadCrud;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
}

/// Reads the `file` part of an image upload and stores it.
pub async fn store_image(state: &AppState, mut multipart: Multipart) -> ApiResult<StoredFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let extension = field
            .content_type()
            .and_then(storage::image_extension)
            .ok_or_else(|| ApiError::field("file", "Only images are allowed!"))?;

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::field("file", "File is empty!"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::field("file", "Image must be 4MB or less!"));
        }

        let stored = state.files.put(bytes.to_vec(), extension).await?;
        tracing::debug!(key = %stored.key, size = bytes.len(), "Stored image");
        return Ok(stored);
    }

    Err(ApiError::field("file", "File is required!"))
}

/// Rejects an image URL pointing at a stored file that belongs to someone else.
pub async fn check_image_url(state: &AppState, user_id: &str, url: &str) -> ApiResult<()> {
    let Some(key) = state.files.key_of(url) else {
        return Ok(());
    };

    if UploadCrud::new(state.db.clone())
        .referenced_by_other(key, user_id)
        .await?
    {
        return Err(ApiError::field("image", "Image not found!"));
    }

    Ok(())
}

/// Deletes the file behind a URL nothing points at any more. Call after the
/// update that dropped the reference. Foreign URLs are left alone and
/// failures are logged, the caller's update has already happened.
pub async fn discard_file(state: &AppState, url: &str) {
    let Some(key) = state.files.key_of(url) else {
        return;
    };

    match UploadCrud::new(state.db.clone()).is_referenced(key).await {
        Ok(false) => {}
        Ok(true) => {
            tracing::debug!(key, "Stored file still in use, keeping it");
            return;
        }
        Err(e) => {
            tracing::warn!(key, "Failed to check file references: {}", e);
            return;
        }
    }

    if let Err(e) = state.files.delete(key).await {
        tracing::warn!(key, "Failed to delete stored file: {}", e);
    }
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let stored = store_image(&state, multipart).await?;
    tracing::info!(user_id = %current.id, key = %stored.key, "File uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: stored.url,
            key: stored.key,
        }),
    ))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    if UploadCrud::new(state.db.clone())
        .referenced_by_other(&key, &current.id)
        .await?
    {
        return Err(ApiError::not_found("File not found!"));
    }

    state.files.delete(&key).await?;
    tracing::info!(user_id = %current.id, key = %key, "File deleted");

    Ok(StatusCode::NO_CONTENT)
}
