//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Registry rejections keep their numeric code in the response body so
//! clients can branch on the same values a direct library caller sees.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use idreg_state::RegistryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "ERR-NOT-BOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Registry error code (100-105), present only for registry rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_code: Option<u16>,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The registry rejected the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing caller principal or invalid gateway token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A required subsystem is not enabled (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

/// HTTP status for a registry rejection.
///
/// Authorization failures are 403, state conflicts are 409, and a missing
/// binding is 404.
pub fn registry_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::NotAuthorized { .. }
        | RegistryError::NotGuardian { .. }
        | RegistryError::AdminTransferDenied { .. } => StatusCode::FORBIDDEN,
        RegistryError::AlreadyBound { .. } | RegistryError::RecoveryTargetBound { .. } => {
            StatusCode::CONFLICT
        }
        RegistryError::NotBound { .. } => StatusCode::NOT_FOUND,
    }
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Registry(err) => (registry_status(err), err.name()),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let registry_code = match &self {
            Self::Registry(err) => Some(err.code()),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                registry_code,
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert idreg-core validation errors to API errors.
impl From<idreg_core::ValidationError> for AppError {
    fn from(err: idreg_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
