use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: String,
    pub user_page_id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub revenue: Option<f64>,
    pub category_id: Option<String>,
    pub status_id: Option<String>,
    pub status_is_visible: bool,
    pub sort_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project joined with its category and status names, as rendered on
/// the page.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub revenue: Option<f64>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub status_id: Option<String>,
    pub status_name: Option<String>,
    pub status_is_visible: bool,
    pub sort_index: i64,
}

/// One column of a partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::Keep)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl FieldUpdate<String> {
    /// Text that may be cleared: absent keeps, empty clears.
    pub fn clearable(value: Option<String>) -> Self {
        match value {
            None => FieldUpdate::Keep,
            Some(value) if value.is_empty() => FieldUpdate::Clear,
            Some(value) => FieldUpdate::Set(value),
        }
    }

    /// Text that is never cleared: absent and empty both keep.
    pub fn non_empty(value: Option<String>) -> Self {
        match value {
            Some(value) if !value.is_empty() => FieldUpdate::Set(value),
            _ => FieldUpdate::Keep,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub image: FieldUpdate<String>,
    pub url: FieldUpdate<String>,
    pub revenue: FieldUpdate<f64>,
    pub category_id: FieldUpdate<String>,
    pub status_id: FieldUpdate<String>,
    pub status_is_visible: FieldUpdate<bool>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProjectPatch::default()
    }
}
