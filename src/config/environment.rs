use std::env;
use std::path::PathBuf;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub session_secret: String,
    pub app_url: String,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub resend_api_key: Option<String>,
    pub resend_from_email: String,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://devpage.db".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET must be set".to_string())?;

        if session_secret.len() < 32 {
            return Err("SESSION_SECRET must be at least 32 characters".to_string());
        }

        let app_url = env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let resend_api_key = env::var("RESEND_API_KEY").ok().filter(|key| !key.is_empty());

        let resend_from_email = env::var("RESEND_FROM_EMAIL")
            .unwrap_or_else(|_| "devpage <onboarding@resend.dev>".to_string());

        let production = env::var("APP_ENV")
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt_secret,
            session_secret,
            app_url,
            bind_addr,
            upload_dir,
            resend_api_key,
            resend_from_email,
            production,
        })
    }
}
