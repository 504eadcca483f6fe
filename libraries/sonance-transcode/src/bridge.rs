/// Format bridge trait
use crate::{error::Result, format::AudioFormat};
use async_trait::async_trait;
use std::path::Path;

/// Converts an audio file on disk into another container/codec
///
/// Implementations signal success or failure through the returned `Result`
/// and never panic; callers decide whether a failure is fatal.
#[async_trait]
pub trait FormatBridge: Send + Sync {
    /// Convert `input` into `output` encoded as `format`, overwriting `output`
    async fn transcode(&self, input: &Path, output: &Path, format: AudioFormat) -> Result<()>;
}
