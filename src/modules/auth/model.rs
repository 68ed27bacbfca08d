use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub two_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Accounts created through an OAuth provider have no local password.
    pub fn is_oauth(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Short-lived token addressed to an email: verification link, password
/// reset link or two-factor code. Each kind lives in its own table.
///
/// `user_id` is set when the address does not belong to an account yet,
/// i.e. a pending email change.
#[derive(Debug, Clone, FromRow)]
pub struct EmailToken {
    pub id: String,
    pub email: String,
    pub user_id: Option<String>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub type VerificationToken = EmailToken;
pub type PasswordResetToken = EmailToken;
pub type TwoFactorToken = EmailToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Verification,
    PasswordReset,
    TwoFactor,
}

impl TokenKind {
    pub fn table(self) -> &'static str {
        match self {
            TokenKind::Verification => "verification_tokens",
            TokenKind::PasswordReset => "password_reset_tokens",
            TokenKind::TwoFactor => "two_factor_tokens",
        }
    }

    pub fn ttl_minutes(self) -> i64 {
        use crate::services::tokens::*;
        match self {
            TokenKind::Verification => VERIFICATION_TOKEN_TTL_MINUTES,
            TokenKind::PasswordReset => PASSWORD_RESET_TOKEN_TTL_MINUTES,
            TokenKind::TwoFactor => TWO_FACTOR_TOKEN_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TwoFactorConfirmation {
    pub id: String,
    pub user_id: String,
}
