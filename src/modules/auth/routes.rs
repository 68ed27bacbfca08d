use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(controller::register))
        .route("/login", post(controller::login))
        .route("/username/check", get(controller::check_username))
        .route(
            "/username/session",
            get(controller::read_username_session)
                .post(controller::save_username_session)
                .delete(controller::clear_username_session),
        )
        .route("/username", post(controller::set_username))
        .route("/verification", post(controller::send_verification))
        .route("/new-verification", post(controller::new_verification))
        .route("/reset", post(controller::reset))
        .route("/new-password", post(controller::new_password))
        .route("/me", get(controller::me))
        .route("/settings", patch(controller::settings))
}
