use thiserror::Error;

/// Domain-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Mask decode failed: {0}")]
    Mask(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
