use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use inkpress_validation::FieldError;

/// Internal error detail attached to 500 responses as a response extension.
///
/// Only the non-production `expose_error_detail` middleware ever puts it on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail(pub String);

/// Handler failure, rendered as the `{success: false, message, errors?}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Validation {
        message: &'static str,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// A framework rejection that already carries its own status.
    #[error("{1}")]
    Rejected(StatusCode, String),

    /// `message` goes to the client; `detail` goes to logs (and, outside
    /// production, to the `error` field).
    #[error("{message}: {detail}")]
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: &'static str, detail: impl core::fmt::Display) -> Self {
        Self::Internal {
            message,
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected(status, _) => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation { message, errors } => (
                status,
                Json(json!({
                    "success": false,
                    "message": message,
                    "errors": errors,
                })),
            )
                .into_response(),
            ApiError::Internal { message, detail } => {
                tracing::error!(error = %detail, "{message}");
                let mut res = json_error(status, message);
                res.extensions_mut().insert(ErrorDetail(detail));
                res
            }
            other => json_error(status, other.to_string()),
        }
    }
}

/// The failure envelope without field errors.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}
