//! API error types with `{error: string}` JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::registry::supported_ids;
use crate::pipeline::GenerationError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Completion API credential missing or malformed")]
    CredentialUnavailable,
    #[error("Upstream completion failure (status {status:?}): {message}")]
    Upstream { status: Option<u16>, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::CredentialUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Completion API key not configured or invalid".to_string(),
            ),
            ApiError::Upstream { status, message } => {
                tracing::error!(upstream_status = ?status, detail = %message, "Document generation failed upstream");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error during document generation".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::UnknownDocumentType(id) => ApiError::BadRequest(format!(
                "Unsupported document type: {id}. Supported types: {}",
                supported_ids()
            )),
            GenerationError::InvalidPatientData(e) => ApiError::BadRequest(e.to_string()),
            GenerationError::MissingCredential => ApiError::CredentialUnavailable,
            GenerationError::CompletionApi { status, message } => {
                ApiError::Upstream { status, message }
            }
        }
    }
}
