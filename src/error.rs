//! Error taxonomy for the frame pipeline

use std::path::PathBuf;

/// A request item could not be turned into a frame
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Image payload is not a data URL (no comma separator)")]
    MissingPayload,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid image data: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure inside the keypoint extractor or the classifier
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model loading failed for {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("Shape mismatch: expected {expected}, got {got}")]
    Shape { expected: String, got: String },

    #[error("Inference failed: {0}")]
    Runtime(String),
}

impl InferenceError {
    pub fn runtime(err: impl std::fmt::Display) -> Self {
        InferenceError::Runtime(err.to_string())
    }
}

/// Anything that can go wrong between raw request bytes and a prediction
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
