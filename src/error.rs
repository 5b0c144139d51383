//! Error types for the prediction service
//!
//! Provides the boundary error type returned by HTTP handlers using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::cache::CacheError;
use crate::ml::ModelError;
use crate::models::ErrorResponse;

/// Message returned to clients for faults whose detail must stay server-side.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

// == Api Error Enum ==
/// Unified error type surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bearer token missing, malformed, tampered with or expired
    #[error("Invalid JWT Token")]
    Unauthorized,

    /// API key missing or mismatched
    #[error("Invalid API Key")]
    Forbidden,

    /// Login with credentials that do not match the configured identity
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// The model could not transform or score the feature payload
    #[error("Inference failed: {0}")]
    Inference(#[from] ModelError),

    /// Cache backend failed and the failure policy is fail-closed
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unanticipated fault; detail is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Inference(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            ApiError::CacheUnavailable(err) => {
                error!(error = %err, "prediction cache unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Prediction cache unavailable".to_string(),
                )
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers and the prediction engine.
pub type Result<T> = std::result::Result<T, ApiError>;
