//! Error types for the clip generator.

use thiserror::Error;

/// Result type for clip generation
pub type Result<T> = std::result::Result<T, ClipError>;

/// Errors that can occur while generating clips.
#[derive(Error, Debug)]
pub enum ClipError {
    /// Missing credential or invalid configuration; fatal before any request
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Prompt file could not be parsed
    #[error("Failed to parse prompt list: {0}")]
    Parse(#[from] toml::de::Error),

    /// Writing the clip to disk failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
