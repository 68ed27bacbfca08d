use axum::{
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/uploads", post(controller::upload))
        .route("/uploads/{key}", delete(controller::delete))
}
