//! HTTP error type shared by every handler.
//!
//! Every variant renders as `{ "detail": "<message>" }` with the matching
//! status. 401 responses also carry `WWW-Authenticate: Bearer` so the client
//! knows to drop its session.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::shared::response::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing or invalid authorization header")]
    Unauthorized,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid username or password")]
    BadCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Database(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn admin_required() -> Self {
        ApiError::Forbidden("Access denied. Admin privileges required.".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Wrap a service failure; `context` prefixes the message
    pub fn internal(context: &str, err: anyhow::Error) -> Self {
        tracing::error!("{}: {:#}", context, err);
        ApiError::Internal(format!("{}: {}", context, err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized
            | ApiError::TokenExpired
            | ApiError::InvalidToken
            | ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::Database(format!("Database error: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
