//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use gigboard_store::StoreError;

use crate::auth::AuthError;
use crate::services::GigServiceError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown instead of internal details in production.
const GENERIC_INTERNAL_MESSAGE: &str = "Server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, ApiError::Store(_))
    }
}

/// Error body: `{"success": false, "message": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let message = if self.is_internal() {
            if std::env::var("ENVIRONMENT")
                .map(|e| e.eq_ignore_ascii_case("production"))
                .unwrap_or(false)
            {
                GENERIC_INTERNAL_MESSAGE.to_string()
            } else {
                self.to_string()
            }
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            success: false,
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<GigServiceError> for ApiError {
    fn from(err: GigServiceError) -> Self {
        match err {
            GigServiceError::InvalidFields(e) => ApiError::Validation(e.to_string()),
            GigServiceError::InvalidStatus(e) => ApiError::Validation(e.to_string()),
            GigServiceError::NotFound(_) => ApiError::not_found("Gig not found"),
            GigServiceError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Store(e) => {
                error!("User lookup failed during authentication: {}", e);
                ApiError::Store(e)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigboard_models::{GigId, InvalidFields, StatusError};

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(StoreError::request_failed("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_mapping() {
        let err = ApiError::from(GigServiceError::InvalidFields(InvalidFields(vec!["title"])));
        assert_eq!(err.to_string(), "Missing required fields: title");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(GigServiceError::InvalidStatus(StatusError::Missing));
        assert_eq!(err.to_string(), "Status is required");

        let err = ApiError::from(GigServiceError::NotFound(GigId::from("g1")));
        assert_eq!(err.to_string(), "Gig not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(ApiError::from(AuthError::MissingToken).to_string(), "No token provided");
        assert_eq!(ApiError::from(AuthError::InvalidToken).to_string(), "Invalid token");
    }
}
