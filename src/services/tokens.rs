use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

pub const VERIFICATION_TOKEN_TTL_MINUTES: i64 = 60;
pub const PASSWORD_RESET_TOKEN_TTL_MINUTES: i64 = 60;
pub const TWO_FACTOR_TOKEN_TTL_MINUTES: i64 = 5;
/// Wrong codes allowed before the outstanding code is thrown away.
pub const MAX_TWO_FACTOR_ATTEMPTS: i64 = 5;

/// Opaque single-use token embedded in emailed links.
pub fn generate_link_token() -> String {
    Uuid::new_v4().to_string()
}

/// Six-digit numeric code for two-factor sign in.
pub fn generate_two_factor_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

pub fn expiry_in(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}

pub fn has_expired(expires_at: DateTime<Utc>) -> bool {
    expires_at < Utc::now()
}
