use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};
use tempfile::TempDir;

use devpage::services::{
    jwt::JwtService,
    mail::{MailTemplates, OutboxMailer},
    rate_limit::RateLimitConfig,
    session::UsernameSession,
    storage::LocalFileStore,
};
use devpage::AppState;

pub const APP_URL: &str = "http://localhost:3000";

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: Pool<Sqlite>,
    pub outbox: Arc<OutboxMailer>,
    pub files: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let db = devpage::config::database::init_memory_db()
            .await
            .expect("Failed to create test database");

        let outbox = Arc::new(OutboxMailer::new());
        let files = tempfile::tempdir().expect("Failed to create upload dir");

        let state = AppState {
            db: db.clone(),
            jwt_service: JwtService::new("test-secret-key-for-testing-only".to_string()),
            mailer: outbox.clone(),
            mail_templates: MailTemplates::new(APP_URL),
            files: Arc::new(LocalFileStore::new(files.path(), APP_URL)),
            username_session: UsernameSession::new(
                "test-session-secret-with-32-characters!".to_string(),
                false,
            ),
            rate_limit: RateLimitConfig {
                per_second: 1000,
                burst: 1000,
            },
            files_dir: Some(files.path().to_path_buf()),
        };

        let server = TestServer::new(devpage::create_app(state)).expect("Failed to create test server");

        Self {
            server,
            db,
            outbox,
            files,
        }
    }

    /// Pulls the `token=` value out of the last link mailed to `email`.
    pub fn mailed_token(&self, email: &str) -> String {
        let message = self.outbox.last_to(email).expect("No mail sent");
        let start = message.html.find("token=").expect("No token in mail") + "token=".len();
        message.html[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect()
    }

    /// Pulls the code out of the last 2FA mail sent to `email`.
    pub fn mailed_code(&self, email: &str) -> String {
        let message = self.outbox.last_to(email).expect("No mail sent");
        let start = message.html.find("code: ").expect("No code in mail") + "code: ".len();
        message.html[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect()
    }

    pub async fn register(&self, email: &str, username: Option<&str>) {
        let response = self
            .server
            .post("/auth/register")
            .json(&json!({
                "email": email,
                "password": test_password(),
                "name": "Test User",
                "username": username,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
    }

    pub async fn verify(&self, email: &str) {
        let token = self.mailed_token(email);
        self.server
            .post("/auth/new-verification")
            .json(&json!({ "token": token }))
            .await
            .assert_status_ok();
    }

    pub async fn login(&self, email: &str) -> String {
        let response = self
            .server
            .post("/auth/login")
            .json(&json!({ "email": email, "password": test_password() }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["access_token"]
            .as_str()
            .expect("No access token in login response")
            .to_string()
    }

    /// Registers, verifies and signs in a fresh user. Returns `(email, token)`.
    pub async fn signed_in_user(&self, username: &str) -> (String, String) {
        let email = test_email();
        self.register(&email, Some(username)).await;
        self.verify(&email).await;
        let token = self.login(&email).await;
        (email, token)
    }

    pub async fn create_project(&self, token: &str, name: &str) -> Value {
        let response = self
            .server
            .post("/projects")
            .authorization_bearer(token)
            .json(&json!({
                "name": name,
                "description": "A project",
                "url": "https://example.com",
                "category": "cat_productivity",
                "project_status": "status_active",
                "revenue": "1000.50",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        body["project"].clone()
    }

    /// Sets a small PNG as the user's photo and returns its public URL.
    pub async fn upload_photo(&self, token: &str) -> String {
        let response = self
            .server
            .post("/profile/photo")
            .authorization_bearer(token)
            .multipart(png_form())
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["image"].as_str().expect("No image url").to_string()
    }

    /// True when the file behind a public URL is still on disk.
    pub fn stored(&self, url: &str) -> bool {
        let key = url.rsplit('/').next().unwrap_or_default();
        !key.is_empty() && self.files.path().join(key).exists()
    }
}

#[allow(dead_code)]
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

#[allow(dead_code)]
pub fn png_form() -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(PNG.to_vec())
            .file_name("image.png")
            .mime_type("image/png"),
    )
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
