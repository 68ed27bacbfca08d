use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn profile_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/u/{username}", get(controller::public_profile))
        .route("/profile", get(controller::panel_page))
        .route("/profile/details", patch(controller::update_details))
        .route("/profile/social-links", put(controller::update_social_links))
        .route("/profile/style", patch(controller::update_style))
        .route(
            "/profile/photo",
            post(controller::change_photo).delete(controller::delete_photo),
        )
}
