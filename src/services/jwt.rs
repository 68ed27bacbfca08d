use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,        // user id
    pub email: String,
    pub username: Option<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Issues and verifies bearer session tokens.
pub struct JwtService {
    secret: String,
    session_duration: Duration,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            session_duration: Duration::days(30),
        }
    }

    pub fn with_duration(secret: String, session_duration: Duration) -> Self {
        Self {
            secret,
            session_duration,
        }
    }

    pub fn create_session_token(
        &self,
        user_id: &str,
        email: &str,
        username: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = now + self.session_duration;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            username: username.map(str::to_string),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_session_token(
        &self,
        token: &str,
    ) -> Result<TokenData<SessionClaims>, jsonwebtoken::errors::Error> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
    }

    pub fn session_duration_secs(&self) -> i64 {
        self.session_duration.num_seconds()
    }
}
