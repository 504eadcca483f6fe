/// Format bridge error types
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Encoder binary missing or not executable
    #[error("Encoder unavailable: {0}")]
    Unavailable(String),

    /// Encoder ran and reported failure
    #[error("Encoder failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    /// Encoder did not finish in time and was killed
    #[error("Encoder timed out after {0:?}")]
    TimedOut(Duration),

    /// Output path resolves to the input file
    #[error("Output would overwrite the input: {0}")]
    OutputIsInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// True when the encoder could not be started at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
