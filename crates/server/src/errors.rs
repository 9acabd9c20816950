use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlrag::RagError;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the `sqlrag` pipeline.
    Rag(RagError),
    /// The request body could not be read as a query.
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        AppError::Rag(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// The HTTP status a pipeline error maps to.
pub fn status_for(err: &RagError) -> StatusCode {
    match err {
        RagError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        RagError::MalformedGeneration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RagError::UpstreamUnavailable { .. } | RagError::EmbeddingModelMismatch { .. } => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Rag(err) => {
                let status = status_for(&err);
                // Log the original error for debugging purposes
                error!(status = %status, "RagError: {:?}", err);
                (status, err.to_string())
            }
            AppError::BadRequest(message) => {
                error!("Rejected request body: {message}");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An internal error occurred: {err}"),
                )
            }
        };

        (status_code, Json(json!({ "error": error_message }))).into_response()
    }
}
