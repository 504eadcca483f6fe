/// Audio-related types
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);
    pub const HIGH_RES_96: Self = Self(96_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Decoded audio held entirely in memory
///
/// Samples are stored as f32, nominally in the range [-1.0, 1.0], laid out
/// frame by frame: `[L, R, L, R, ...]` for stereo. A buffer is therefore a
/// `frames × channels` matrix in row-major order.
///
/// Invariants (checked by [`AudioBuffer::new`]):
/// - at least one channel
/// - non-zero sample rate
/// - sample count is a whole number of frames
/// - every sample is finite
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: SampleRate,
}

impl AudioBuffer {
    /// Create a new audio buffer from interleaved samples
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: SampleRate) -> Result<Self> {
        if channels == 0 {
            return Err(CoreError::invalid_buffer("channel count must be at least 1"));
        }
        if sample_rate.as_hz() == 0 {
            return Err(CoreError::invalid_buffer("sample rate must be positive"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(CoreError::invalid_buffer(format!(
                "sample count {} is not divisible by channel count {}",
                samples.len(),
                channels
            )));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(CoreError::invalid_buffer(format!(
                "sample {} is not finite",
                index
            )));
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a buffer of digital silence
    pub fn silence(frames: usize, channels: u16, sample_rate: SampleRate) -> Result<Self> {
        Self::new(vec![0.0; frames * channels as usize], channels, sample_rate)
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning the interleaved samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Samples of a single frame, one per channel
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let channels = self.channels as usize;
        let start = index.checked_mul(channels)?;
        self.samples.get(start..start + channels)
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.as_hz() as f64
    }

    /// Check if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Largest absolute sample value across all channels (0.0 when empty)
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
    }

    /// Check whether every sample is exactly zero
    pub fn is_digital_silence(&self) -> bool {
        self.samples.iter().all(|s| *s == 0.0)
    }

    /// Multiply every sample by a linear gain factor in place
    ///
    /// Non-finite gains are ignored so the finite-sample invariant holds.
    pub fn apply_gain(&mut self, gain: f64) {
        if !gain.is_finite() || gain == 1.0 {
            return;
        }
        for sample in &mut self.samples {
            *sample = (f64::from(*sample) * gain) as f32;
        }
    }

    /// Return a copy of this buffer scaled by a linear gain factor
    #[must_use]
    pub fn with_gain(&self, gain: f64) -> Self {
        let mut scaled = self.clone();
        scaled.apply_gain(gain);
        scaled
    }
}
