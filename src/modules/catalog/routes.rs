use axum::{routing::get, Router};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(controller::categories))
        .route("/project-statuses", get(controller::project_statuses))
}
