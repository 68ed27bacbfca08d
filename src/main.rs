use std::sync::Arc;

use devpage::config::{init_db, Config};
use devpage::modules::auth::{crud::TokenCrud, model::TokenKind};
use devpage::services::{
    jwt::JwtService,
    mail::{LogMailer, MailTemplates, Mailer, ResendMailer},
    rate_limit::RateLimitConfig,
    session::UsernameSession,
    storage::LocalFileStore,
};
use devpage::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devpage=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let db = init_db(&config.database_url).await?;
    tracing::info!("Connected to {}", config.database_url);

    let tokens = TokenCrud::new(db.clone());
    for kind in [TokenKind::Verification, TokenKind::PasswordReset, TokenKind::TwoFactor] {
        let removed = tokens.delete_expired(kind, chrono::Utc::now()).await?;
        if removed > 0 {
            tracing::info!(table = kind.table(), removed, "Removed expired tokens");
        }
    }

    let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
        Some(api_key) => Arc::new(ResendMailer::new(
            reqwest::Client::new(),
            api_key.clone(),
            config.resend_from_email.clone(),
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set, outgoing mail is only logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState {
        db,
        jwt_service: JwtService::new(config.jwt_secret.clone()),
        mailer,
        mail_templates: MailTemplates::new(config.app_url.clone()),
        files: Arc::new(LocalFileStore::new(
            config.upload_dir.clone(),
            config.app_url.clone(),
        )),
        username_session: UsernameSession::new(config.session_secret.clone(), config.production),
        rate_limit: RateLimitConfig::default(),
        files_dir: Some(config.upload_dir.clone()),
    };

    let app = devpage::create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
