use thiserror::Error;

/// Errors produced by the model layer.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A document does not conform to the expected message shape.
    #[error("Document conversion error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ModelError>;
