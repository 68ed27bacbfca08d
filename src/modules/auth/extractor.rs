use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller, taken from the `Authorization: Bearer` session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(ApiError::unauthorized)?;

        let data = state.jwt_service.verify_session_token(token).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            ApiError::unauthorized()
        })?;

        Ok(CurrentUser {
            id: data.claims.sub,
            email: data.claims.email,
            username: data.claims.username,
        })
    }
}
