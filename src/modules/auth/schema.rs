use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::auth::model::User;
use crate::services::validation::validate_username;

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Minimum 6 characters required"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    pub callback_url: Option<String>,
}

// =============================================================================
// USERNAME
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct UsernameRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub available: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UsernameSessionResponse {
    pub username: Option<String>,
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    VerificationSent {
        success: &'static str,
    },
    TwoFactorRequired {
        two_factor: bool,
    },
    Session {
        success: &'static str,
        access_token: String,
        token_type: &'static str,
        expires_in: i64,
        user: UserResponse,
    },
}

// =============================================================================
// VERIFICATION & PASSWORD RESET
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Missing token!"))]
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 1, message = "Missing token!"))]
    pub token: String,
    #[validate(length(min = 6, message = "Minimum 6 characters required"))]
    pub password: String,
}

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SettingsRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub password: Option<String>,
    #[validate(length(min = 6, message = "Minimum 6 characters required"))]
    pub new_password: Option<String>,
    pub two_factor_enabled: Option<bool>,
}

// =============================================================================
// ME (Current User)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub username: Option<String>,
    pub image: Option<String>,
    pub two_factor_enabled: bool,
    pub is_oauth: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified.is_some(),
            username: user.username.clone(),
            image: user.image.clone(),
            two_factor_enabled: user.two_factor_enabled,
            is_oauth: user.is_oauth(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}
