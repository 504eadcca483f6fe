//! Error types for loudness measurement

use sonance_core::SampleRate;
use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur during loudness measurement
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(u16),

    /// Buffer sample rate differs from the rate the meter was built for
    #[error("Meter is bound to {meter} but buffer is {buffer}")]
    SampleRateMismatch {
        /// Rate the meter was constructed with
        meter: SampleRate,
        /// Rate of the offered buffer
        buffer: SampleRate,
    },

    /// Normalization target outside its valid range
    #[error("Invalid normalization target: {0}")]
    InvalidTarget(String),

    /// EBU R128 analysis error
    #[error("EBU R128 analysis failed: {0}")]
    AnalysisError(String),
}

impl From<ebur128::Error> for LoudnessError {
    fn from(err: ebur128::Error) -> Self {
        Self::AnalysisError(format!("{:?}", err))
    }
}
