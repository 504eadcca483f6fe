/// Core error types for Sonance
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Sonance
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Buffer violates one of its invariants
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),
}

impl CoreError {
    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }
}
