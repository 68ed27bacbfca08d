use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

/// Tagged error returned by every handler.
///
/// Renders as `{ "error": "...", "fields": {...} }` so the UI can show a
/// transient notification or field-level messages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid fields!")]
    Validation(BTreeMap<String, Vec<String>>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Gone(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized!".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn gone(message: impl Into<String>) -> Self {
        Self::Gone(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::Validation(fields)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Gone(_) => StatusCode::GONE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(fields) => ErrorResponse {
                error: "Invalid fields!".to_string(),
                fields: Some(fields),
            },
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                ErrorResponse {
                    error: "Something went wrong!".to_string(),
                    fields: None,
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                fields: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|err| match &err.message {
                        Some(message) => message.to_string(),
                        None => err.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        ApiError::Validation(fields)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ApiError::conflict("Already in use!");
            }
        }
        ApiError::Internal(format!("Database error: {}", err))
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ApiError::Internal(format!("Hashing error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Internal(format!("Token error: {}", err))
    }
}

impl From<crate::services::storage::StorageError> for ApiError {
    fn from(err: crate::services::storage::StorageError) -> Self {
        match err {
            crate::services::storage::StorageError::InvalidKey => {
                ApiError::bad_request("Invalid file key!")
            }
            other => ApiError::Internal(format!("Storage error: {}", other)),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        tracing::debug!("Rejected multipart body: {}", err);
        ApiError::bad_request("Invalid upload!")
    }
}
