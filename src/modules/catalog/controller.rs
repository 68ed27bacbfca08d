use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::AppState;
use super::{
    crud::CatalogCrud,
    model::{Category, ProjectStatus},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectStatusesResponse {
    pub project_statuses: Vec<ProjectStatus>,
}

pub async fn categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = CatalogCrud::new(state.db.clone()).categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

pub async fn project_statuses(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ProjectStatusesResponse>> {
    let project_statuses = CatalogCrud::new(state.db.clone()).project_statuses().await?;
    Ok(Json(ProjectStatusesResponse { project_statuses }))
}
