use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::{crud::UserCrud, CurrentUser};
use crate::modules::catalog::crud::CatalogCrud;
use crate::modules::profile::crud::PageCrud;
use crate::modules::upload::{check_image_url, discard_file, store_image};
use crate::response::{SuccessResponse, SAVED};
use crate::services::validation::parse_revenue;
use crate::AppState;
use super::{
    crud::ProjectCrud,
    model::{Project, ProjectView},
    schema::{
        CreateProjectRequest, ProjectEnvelope, ProjectsResponse, ReorderRequest,
        UpdateProjectRequest,
    },
};

async fn owner_page_id(state: &AppState, current: &CurrentUser) -> ApiResult<String> {
    Ok(PageCrud::new(state.db.clone())
        .ensure_for_user(&current.id)
        .await?
        .id)
}

async fn check_catalog(
    state: &AppState,
    category: Option<&str>,
    status: Option<&str>,
) -> ApiResult<()> {
    let catalog = CatalogCrud::new(state.db.clone());

    if let Some(category) = category {
        if !catalog.category_exists(category).await? {
            return Err(ApiError::field("category", "Unknown category!"));
        }
    }
    if let Some(status) = status {
        if !catalog.status_exists(status).await? {
            return Err(ApiError::field("project_status", "Unknown project status!"));
        }
    }

    Ok(())
}

async fn project_view(state: &AppState, id: &str) -> ApiResult<ProjectView> {
    ProjectCrud::new(state.db.clone())
        .find_view(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found!"))
}

// =============================================================================
// READ
// =============================================================================

pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProjectsResponse>> {
    let user = UserCrud::new(state.db.clone())
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found!"))?;

    let projects = match PageCrud::new(state.db.clone())
        .find_by_user_id(&user.id)
        .await?
    {
        Some(page) => ProjectCrud::new(state.db.clone()).list_views(&page.id).await?,
        None => Vec::new(),
    };

    Ok(Json(ProjectsResponse { projects }))
}

// =============================================================================
// WRITE
// =============================================================================

pub async fn create(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProjectEnvelope>>)> {
    req.validate()?;

    let revenue = req
        .revenue
        .as_deref()
        .map(parse_revenue)
        .transpose()
        .map_err(|_| ApiError::field("revenue", "Invalid revenue (eq. 1000.00)"))?;

    check_catalog(&state, Some(&req.category), Some(&req.project_status)).await?;

    let page_id = owner_page_id(&state, &current).await?;

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        user_page_id: page_id,
        name: req.name,
        description: req.description.filter(|d| !d.is_empty()),
        image: None,
        url: req.url.filter(|u| !u.is_empty()),
        revenue,
        category_id: Some(req.category),
        status_id: Some(req.project_status),
        status_is_visible: true,
        sort_index: 0,
        created_at: now,
        updated_at: now,
    };

    ProjectCrud::new(state.db.clone()).append(&project).await?;
    tracing::info!(user_id = %current.id, project_id = %project.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with(
            SAVED,
            ProjectEnvelope {
                project: project_view(&state, &project.id).await?,
            },
        )),
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<SuccessResponse<ProjectEnvelope>>> {
    req.validate()?;

    let page_id = owner_page_id(&state, &current).await?;
    let projects = ProjectCrud::new(state.db.clone());

    let project = projects
        .find_owned(&id, &page_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found!"))?;

    let patch = req.into_patch().map_err(|e| {
        ApiError::field(
            "revenue",
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid revenue".to_string()),
        )
    })?;

    check_catalog(
        &state,
        patch.category_id.value().map(String::as_str),
        patch.status_id.value().map(String::as_str),
    )
    .await?;

    if let Some(image) = patch.image.value() {
        check_image_url(&state, &current.id, image).await?;
    }

    if !patch.is_empty() {
        projects.update(&project.id, &patch).await?;
    }

    // A replaced or cleared image leaves its old file behind.
    if patch.image.is_change() {
        if let Some(previous) = project.image.as_deref() {
            if patch.image.value().map(String::as_str) != Some(previous) {
                discard_file(&state, previous).await;
            }
        }
    }

    Ok(Json(SuccessResponse::with(
        SAVED,
        ProjectEnvelope {
            project: project_view(&state, &project.id).await?,
        },
    )))
}

pub async fn update_image(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<SuccessResponse<ProjectEnvelope>>> {
    let page_id = owner_page_id(&state, &current).await?;
    let projects = ProjectCrud::new(state.db.clone());

    let project = projects
        .find_owned(&id, &page_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found!"))?;

    let stored = store_image(&state, multipart).await?;
    projects.set_image(&project.id, Some(&stored.url)).await?;

    if let Some(previous) = project.image.as_deref() {
        discard_file(&state, previous).await;
    }

    Ok(Json(SuccessResponse::with(
        SAVED,
        ProjectEnvelope {
            project: project_view(&state, &project.id).await?,
        },
    )))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let page_id = owner_page_id(&state, &current).await?;
    let projects = ProjectCrud::new(state.db.clone());

    let project = projects
        .find_owned(&id, &page_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found!"))?;

    if !projects.delete_and_compact(&project.id, &page_id).await? {
        return Err(ApiError::not_found("Project not found!"));
    }

    if let Some(image) = project.image.as_deref() {
        discard_file(&state, image).await;
    }

    tracing::info!(user_id = %current.id, project_id = %project.id, "Project deleted");

    Ok(Json(SuccessResponse::message("Project deleted!")))
}

pub async fn reorder(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<SuccessResponse<ProjectsResponse>>> {
    let page_id = owner_page_id(&state, &current).await?;
    let projects = ProjectCrud::new(state.db.clone());

    projects.reorder(&page_id, &req.project_ids).await?;

    Ok(Json(SuccessResponse::with(
        SAVED,
        ProjectsResponse {
            projects: projects.list_views(&page_id).await?,
        },
    )))
}
