//! Error types for checklist decoding

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while decoding checklist data
#[derive(Debug, Error)]
pub enum ModelError {
    /// The JSON document does not have the checklist shape
    #[error("Invalid checklist JSON: {0}")]
    Json(#[from] serde_json::Error),
}
