//! HTTP error handling for the position API
//!
//! Every failure is returned as `{message, code, details?}`; the status is
//! derived from `code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use orgchart_core::PositionServiceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    /// No position has this id
    pub fn not_found(id: &str) -> Self {
        Self::new(format!("Position not found: {}", id), "POSITION_NOT_FOUND")
    }

    /// Failure of a multi-record delete, reported as a rejected request
    pub fn operation_failed(operation: &str, err: PositionServiceError) -> Self {
        Self::with_details(
            format!("Error during {}: {}", operation, err),
            "OPERATION_FAILED",
            format!("{:?}", err),
        )
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "POSITION_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_REFERENCE" | "HAS_CHILDREN" | "OPERATION_FAILED" => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<PositionServiceError> for HttpError {
    fn from(err: PositionServiceError) -> Self {
        let code = match &err {
            PositionServiceError::ValidationFailed(_) => "VALIDATION_ERROR",
            PositionServiceError::InvalidReference { .. } => "INVALID_REFERENCE",
            PositionServiceError::HasChildren { .. } => "HAS_CHILDREN",
            PositionServiceError::StoreFailed(_) => "DATABASE_ERROR",
        };
        HttpError::new(err.to_string(), code)
    }
}
