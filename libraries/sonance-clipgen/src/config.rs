//! Clip generator configuration.

use crate::error::{ClipError, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Sound-generation endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://api.elevenlabs.io/v1/sound-generation";

/// Encoding requested from the endpoint (codec, sample rate, bitrate)
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Everything the generator needs to talk to the endpoint.
///
/// Built explicitly by the caller (the CLI fills it from config files and the
/// environment) and checked with [`ClipGeneratorConfig::validate`] before use.
#[derive(Clone)]
pub struct ClipGeneratorConfig {
    /// API key sent in the `xi-api-key` header
    pub api_key: String,
    /// Full URL of the generation endpoint
    pub endpoint: String,
    /// Value of the `output_format` query parameter
    pub output_format: String,
    /// Directory clips are written to
    pub output_dir: PathBuf,
    /// Upper bound on a single request
    pub request_timeout: Duration,
}

impl ClipGeneratorConfig {
    /// Create a configuration with default endpoint and format.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            output_dir: PathBuf::from("."),
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = output_format.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Fail fast on missing credentials or an unusable endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClipError::config(
                "API key is required (set ELEVENLABS_API_KEY)",
            ));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ClipError::config(format!(
                "Endpoint must start with http:// or https://, got {:?}",
                self.endpoint
            )));
        }

        if self.output_format.trim().is_empty() {
            return Err(ClipError::config("Output format cannot be empty"));
        }

        if self.request_timeout.is_zero() {
            return Err(ClipError::config("Request timeout must be positive"));
        }

        Ok(())
    }

    /// File extension of the audio the endpoint returns (`mp3_44100_128` -> `mp3`)
    pub fn source_extension(&self) -> &str {
        self.output_format
            .split('_')
            .next()
            .filter(|ext| !ext.is_empty())
            .unwrap_or("mp3")
    }
}

// Keep the key out of logs
impl fmt::Debug for ClipGeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipGeneratorConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("output_format", &self.output_format)
            .field("output_dir", &self.output_dir)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
