//! Error handling utilities for route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{DecodeError, InferenceError, PipelineError};

/// Errors a handler can return, each mapped to its own status code
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Request refused by an extractor before the handler ran (size, content type)
    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("{0}")]
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode(e) => ApiError::Decode(e),
            PipelineError::Inference(e) => ApiError::Inference(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            // Clients of /process_frame expect 500 for unusable images
            ApiError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return it as an ApiError
    fn log_err(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: Into<ApiError>> LogErr<T> for Result<T, E> {
    fn log_err(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            let err = e.into();
            log::error!("{}: {}", context, err);
            err
        })
    }
}
