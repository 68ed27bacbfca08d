use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::model::{FieldUpdate, ProjectPatch, ProjectView};
use crate::services::validation::{
    parse_revenue, validate_revenue, validate_revenue_or_empty, validate_url,
    validate_url_or_empty,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 75, message = "Name must be between 1 and 75 characters"))]
    pub name: String,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_url"))]
    pub url: Option<String>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Project status is required"))]
    pub project_status: String,
    #[validate(custom(function = "validate_revenue"))]
    pub revenue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(custom(function = "validate_url_or_empty"))]
    pub image: Option<String>,
    #[validate(length(min = 1, max = 75, message = "Name must be between 1 and 75 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_url_or_empty"))]
    pub url: Option<String>,
    pub category: Option<String>,
    pub project_status: Option<String>,
    #[validate(custom(function = "validate_revenue_or_empty"))]
    pub revenue: Option<String>,
    pub status_is_visible: Option<bool>,
}

impl UpdateProjectRequest {
    /// Call after `validate()`; revenue is parsed again here.
    pub fn into_patch(self) -> Result<ProjectPatch, ValidationError> {
        let revenue = match self.revenue.as_deref() {
            None | Some("") => FieldUpdate::Keep,
            Some(value) => FieldUpdate::Set(parse_revenue(value)?),
        };

        Ok(ProjectPatch {
            name: self.name.map_or(FieldUpdate::Keep, FieldUpdate::Set),
            description: FieldUpdate::clearable(self.description),
            image: FieldUpdate::clearable(self.image),
            url: FieldUpdate::clearable(self.url),
            revenue,
            category_id: FieldUpdate::non_empty(self.category),
            status_id: FieldUpdate::non_empty(self.project_status),
            status_is_visible: self
                .status_is_visible
                .map_or(FieldUpdate::Keep, FieldUpdate::Set),
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderRequest {
    pub project_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectEnvelope {
    pub project: ProjectView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectView>,
}
