/// Application error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Run-level errors. Per-file problems are recorded in the batch report instead.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio error: {0}")]
    Audio(#[from] sonance_audio::AudioError),

    #[error("Loudness error: {0}")]
    Loudness(#[from] sonance_loudness::LoudnessError),

    #[error("Clip generation error: {0}")]
    Clip(#[from] sonance_clipgen::ClipError),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
