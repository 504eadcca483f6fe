/// Audio I/O errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Path exists but cannot be used as requested
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Input is unreadable, corrupt or holds no audio
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output could not be written
    #[error("Encode error: {0}")]
    Encode(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<sonance_core::CoreError> for AudioError {
    fn from(err: sonance_core::CoreError) -> Self {
        Self::Decode(err.to_string())
    }
}
