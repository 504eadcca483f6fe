//! Lossless WAV output
//!
//! Writes an [`AudioBuffer`] to a RIFF/WAVE file with hound. Integer depths scale
//! by 2^(N-1) and saturate at the top code, mirroring the symmetric scaling the
//! decoder uses on the way in.

use crate::error::{AudioError, Result};
use sonance_core::AudioBuffer;
use std::path::Path;

/// PCM sample format of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcmBitDepth {
    /// 16-bit signed integer
    Int16,
    /// 24-bit signed integer
    #[default]
    Int24,
    /// 32-bit IEEE float
    Float32,
}

impl PcmBitDepth {
    /// Bits per sample
    pub fn bits(&self) -> u16 {
        match self {
            Self::Int16 => 16,
            Self::Int24 => 24,
            Self::Float32 => 32,
        }
    }

    fn hound_spec(&self, buffer: &AudioBuffer) -> hound::WavSpec {
        hound::WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate().as_hz(),
            bits_per_sample: self.bits(),
            sample_format: match self {
                Self::Float32 => hound::SampleFormat::Float,
                Self::Int16 | Self::Int24 => hound::SampleFormat::Int,
            },
        }
    }
}

/// Quantize a float sample to a signed integer of `bits` width
fn quantize(sample: f32, bits: u16) -> i32 {
    let scale = f64::from(1_u32 << (bits - 1));
    let max = scale - 1.0;
    (f64::from(sample) * scale).round().clamp(-scale, max) as i32
}

/// WAV file writer
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder {
    bit_depth: PcmBitDepth,
}

impl WavEncoder {
    /// Create an encoder writing 24-bit PCM
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with a specific sample format
    pub fn with_bit_depth(bit_depth: PcmBitDepth) -> Self {
        Self { bit_depth }
    }

    /// Configured sample format
    pub fn bit_depth(&self) -> PcmBitDepth {
        self.bit_depth
    }

    /// Write `buffer` to `path`, replacing any existing file
    ///
    /// A partially written file is removed on failure.
    pub fn encode(&self, buffer: &AudioBuffer, path: &Path) -> Result<()> {
        let result = self.write(buffer, path);
        if result.is_err() && path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!("Failed to remove partial output {}: {}", path.display(), e);
            }
        }
        result
    }

    fn write(&self, buffer: &AudioBuffer, path: &Path) -> Result<()> {
        let spec = self.bit_depth.hound_spec(buffer);
        let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
            AudioError::Encode(format!("Failed to create {}: {}", path.display(), e))
        })?;

        match self.bit_depth {
            PcmBitDepth::Float32 => {
                for &sample in buffer.samples() {
                    writer.write_sample(sample)?;
                }
            }
            PcmBitDepth::Int16 | PcmBitDepth::Int24 => {
                let bits = self.bit_depth.bits();
                for &sample in buffer.samples() {
                    writer.write_sample(quantize(sample, bits))?;
                }
            }
        }

        writer.finalize()?;

        tracing::debug!(
            "Wrote {} ({} frames, {}-bit)",
            path.display(),
            buffer.frames(),
            self.bit_depth.bits()
        );
        Ok(())
    }
}
