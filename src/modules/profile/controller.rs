use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::{crud::UserCrud, schema::UserResponse, CurrentUser};
use crate::modules::project::crud::ProjectCrud;
use crate::modules::upload::{discard_file, store_image};
use crate::response::{SuccessResponse, SAVED};
use crate::AppState;
use super::{
    crud::PageCrud,
    model::UserPage,
    schema::{
        ImageResponse, PageEnvelope, PageResponse, PanelResponse, PublicProfileResponse,
        PublicUser, SocialLinksRequest, UpdateDetailsRequest, UpdateStyleRequest,
    },
};

async fn page_response(state: &AppState, page: &UserPage) -> ApiResult<PageResponse> {
    let links = PageCrud::new(state.db.clone()).links(&page.id).await?;
    Ok(PageResponse::new(page, &links))
}

async fn owner_page(state: &AppState, current: &CurrentUser) -> ApiResult<UserPage> {
    Ok(PageCrud::new(state.db.clone())
        .ensure_for_user(&current.id)
        .await?)
}

// =============================================================================
// READ
// =============================================================================

pub async fn public_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<PublicProfileResponse>> {
    let user = UserCrud::new(state.db.clone())
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found!"))?;

    let (page, projects) = match PageCrud::new(state.db.clone())
        .find_by_user_id(&user.id)
        .await?
    {
        Some(page) => (
            page_response(&state, &page).await?,
            ProjectCrud::new(state.db.clone()).list_views(&page.id).await?,
        ),
        None => (PageResponse::default(), Vec::new()),
    };

    Ok(Json(PublicProfileResponse {
        user: PublicUser {
            id: user.id,
            username: user.username,
            name: user.name,
            image: user.image,
        },
        page,
        projects,
    }))
}

pub async fn panel_page(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<PanelResponse>> {
    let user = UserCrud::new(state.db.clone())
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    let page = owner_page(&state, &current).await?;
    let projects = ProjectCrud::new(state.db.clone()).list_views(&page.id).await?;

    Ok(Json(PanelResponse {
        user: UserResponse::from(&user),
        page: page_response(&state, &page).await?,
        projects,
    }))
}

// =============================================================================
// EDIT
// =============================================================================

pub async fn update_details(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<UpdateDetailsRequest>,
) -> ApiResult<Json<SuccessResponse<PageEnvelope>>> {
    req.validate()?;

    let pages = PageCrud::new(state.db.clone());
    let page = owner_page(&state, &current).await?;

    if let Some(name) = req.name.as_deref() {
        UserCrud::new(state.db.clone())
            .update_settings(&current.id, Some(name), None)
            .await?;
    }

    pages
        .update_details(
            &page.id,
            req.biography.as_deref(),
            req.location.as_deref(),
            req.contact_email.as_deref(),
        )
        .await?;

    let page = owner_page(&state, &current).await?;

    Ok(Json(SuccessResponse::with(
        SAVED,
        PageEnvelope {
            page: page_response(&state, &page).await?,
        },
    )))
}

pub async fn update_social_links(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<SocialLinksRequest>,
) -> ApiResult<Json<SuccessResponse<PageEnvelope>>> {
    req.validate()?;

    let page = owner_page(&state, &current).await?;
    let entries = req.entries();

    PageCrud::new(state.db.clone())
        .apply_links(&page.id, &entries)
        .await?;

    tracing::debug!(user_id = %current.id, changed = entries.len(), "Social links updated");

    Ok(Json(SuccessResponse::with(
        SAVED,
        PageEnvelope {
            page: page_response(&state, &page).await?,
        },
    )))
}

pub async fn update_style(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<UpdateStyleRequest>,
) -> ApiResult<Json<SuccessResponse<PageEnvelope>>> {
    let page = owner_page(&state, &current).await?;

    PageCrud::new(state.db.clone())
        .update_styles(
            &page.id,
            req.background_style.map(|s| s.as_db()),
            req.project_cards_style.map(|s| s.as_db()),
            req.social_links_style.map(|s| s.as_db()),
        )
        .await?;

    let page = owner_page(&state, &current).await?;

    Ok(Json(SuccessResponse::with(
        SAVED,
        PageEnvelope {
            page: page_response(&state, &page).await?,
        },
    )))
}

// =============================================================================
// PHOTO
// =============================================================================

pub async fn change_photo(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    multipart: Multipart,
) -> ApiResult<Json<SuccessResponse<ImageResponse>>> {
    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    let stored = store_image(&state, multipart).await?;
    users.update_image(&user.id, Some(&stored.url)).await?;

    if let Some(previous) = user.image.as_deref() {
        discard_file(&state, previous).await;
    }

    Ok(Json(SuccessResponse::with(
        "Photo updated!",
        ImageResponse {
            image: Some(stored.url),
        },
    )))
}

pub async fn delete_photo(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<SuccessResponse<ImageResponse>>> {
    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    let image = user
        .image
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("No image to delete!"))?;

    users.update_image(&user.id, None).await?;
    discard_file(&state, image).await;

    Ok(Json(SuccessResponse::with(
        "Photo deleted!",
        ImageResponse { image: None },
    )))
}
