use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/u/{username}/projects", get(controller::list))
        .route("/projects", post(controller::create))
        .route("/projects/order", put(controller::reorder))
        .route(
            "/projects/{id}",
            patch(controller::update).delete(controller::delete),
        )
        .route("/projects/{id}/image", post(controller::update_image))
}
