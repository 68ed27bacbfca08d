pub mod client;
pub mod config;
pub mod error;
pub mod modules;
pub mod response;
pub mod services;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Json, Router};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};

use config::DbPool;
use error::{ApiError, ApiResult};
use modules::{
    auth::auth_routes, catalog::catalog_routes, profile::profile_routes,
    project::project_routes, upload::upload_routes,
};
use services::jwt::JwtService;
use services::mail::{MailMessage, MailTemplates, Mailer};
use services::rate_limit::{create_rate_limiter, RateLimitConfig, RateLimitLayer};
use services::security::security_headers;
use services::session::UsernameSession;
use services::storage::FileStore;

/// Largest request body accepted, sized for one image upload plus form overhead.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: JwtService,
    pub mailer: Arc<dyn Mailer>,
    pub mail_templates: MailTemplates,
    pub files: Arc<dyn FileStore>,
    pub username_session: UsernameSession,
    pub rate_limit: RateLimitConfig,
    /// Serve stored files from this directory under `/files`.
    pub files_dir: Option<PathBuf>,
}

impl AppState {
    /// Sends a transactional email. Delivery failures surface as a generic
    /// error; the cause is logged.
    pub async fn deliver(&self, message: MailMessage) -> ApiResult<()> {
        let to = message.to.clone();
        self.mailer.send(message).await.map_err(|e| {
            ApiError::internal(format!("Failed to send mail to {}: {}", to, e))
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let rate_limiter = create_rate_limiter(state.rate_limit);
    let files_dir = state.files_dir.clone();
    let state = Arc::new(state);

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .merge(catalog_routes())
        .merge(profile_routes())
        .merge(project_routes())
        .merge(upload_routes());

    if let Some(dir) = files_dir {
        router = router.nest_service("/files", ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn(security_headers))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "devpage API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
