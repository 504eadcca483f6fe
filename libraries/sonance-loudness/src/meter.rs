//! EBU R128 loudness measurement
//!
//! This module provides ITU-R BS.1770 integrated loudness measurement using the ebur128 crate.
//! A [`LoudnessMeter`] is bound to one sample rate; it holds no per-measurement state, so a
//! single meter can be shared across every buffer recorded at that rate.
//!
//! Silence (and audio shorter than one 400 ms gating block) measures as negative infinity.
//! That is a value, not an error: callers decide what "cannot normalize" means for them.

use crate::error::{LoudnessError, Result};
use ebur128::{EbuR128, Mode};
use sonance_core::{AudioBuffer, SampleRate};
use std::fmt;

/// Returns true when a loudness value carries no usable level (silence or gated out)
pub fn is_silent(lufs: f64) -> bool {
    !lufs.is_finite()
}

/// Information about the loudness characteristics of a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessInfo {
    /// Integrated loudness in LUFS (negative infinity for silence)
    pub integrated_lufs: f64,

    /// Sample peak as a linear value (1.0 = full scale)
    pub sample_peak: f64,

    /// True peak in dBTP, measured with 4x oversampling as per ITU-R BS.1770
    pub true_peak_dbtp: f64,

    /// Duration of the analyzed audio in seconds
    pub duration_seconds: f64,

    /// Sample rate of the analyzed audio
    pub sample_rate: SampleRate,

    /// Number of channels
    pub channels: u16,
}

impl LoudnessInfo {
    /// Sample peak in dBFS
    pub fn sample_peak_dbfs(&self) -> f64 {
        crate::gain::linear_to_db(self.sample_peak)
    }

    /// Whether the measurement found any audible content
    pub fn is_silent(&self) -> bool {
        is_silent(self.integrated_lufs)
    }
}

impl fmt::Display for LoudnessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_silent() {
            write!(f, "Loudness: silent")?;
        } else {
            write!(f, "Loudness: {:.1} LUFS", self.integrated_lufs)?;
        }
        write!(
            f,
            ", Sample Peak: {:.1} dBFS, True Peak: {:.1} dBTP, {:.2}s @ {}",
            self.sample_peak_dbfs(),
            self.true_peak_dbtp,
            self.duration_seconds,
            self.sample_rate
        )
    }
}

/// Integrated loudness meter bound to a single sample rate
///
/// # Example
///
/// ```ignore
/// use sonance_loudness::LoudnessMeter;
///
/// let meter = LoudnessMeter::new(SampleRate::CD_QUALITY)?;
/// let lufs = meter.measure(&buffer)?;
/// println!("Integrated loudness: {:.1} LUFS", lufs);
/// ```
#[derive(Debug, Clone)]
pub struct LoudnessMeter {
    sample_rate: SampleRate,
}

impl LoudnessMeter {
    /// Create a meter for buffers recorded at `sample_rate`
    ///
    /// # Errors
    /// Returns error if the sample rate is outside 8 kHz - 384 kHz
    pub fn new(sample_rate: SampleRate) -> Result<Self> {
        if !(8000..=384_000).contains(&sample_rate.as_hz()) {
            return Err(LoudnessError::InvalidSampleRate(sample_rate.as_hz()));
        }
        tracing::debug!("Created loudness meter for {}", sample_rate);
        Ok(Self { sample_rate })
    }

    /// Sample rate this meter is bound to
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Integrated loudness of `buffer` in LUFS
    ///
    /// Returns `f64::NEG_INFINITY` for silent or too-short input.
    pub fn measure(&self, buffer: &AudioBuffer) -> Result<f64> {
        let ebur128 = self.run(buffer, Mode::I)?;
        Ok(ebur128.loudness_global()?)
    }

    /// Integrated loudness plus sample and true peak of `buffer`
    pub fn analyze(&self, buffer: &AudioBuffer) -> Result<LoudnessInfo> {
        let ebur128 = self.run(buffer, Mode::I | Mode::SAMPLE_PEAK | Mode::TRUE_PEAK)?;

        let integrated_lufs = ebur128.loudness_global()?;

        let mut sample_peak = 0.0_f64;
        let mut true_peak = 0.0_f64;
        for ch in 0..u32::from(buffer.channels()) {
            sample_peak = sample_peak.max(ebur128.sample_peak(ch).unwrap_or(0.0));
            true_peak = true_peak.max(ebur128.true_peak(ch).unwrap_or(0.0));
        }

        Ok(LoudnessInfo {
            integrated_lufs,
            sample_peak,
            true_peak_dbtp: crate::gain::linear_to_db(true_peak),
            duration_seconds: buffer.duration_secs(),
            sample_rate: buffer.sample_rate(),
            channels: buffer.channels(),
        })
    }

    /// Feed the whole buffer through a fresh EBU R128 state
    fn run(&self, buffer: &AudioBuffer, mode: Mode) -> Result<EbuR128> {
        if buffer.sample_rate() != self.sample_rate {
            return Err(LoudnessError::SampleRateMismatch {
                meter: self.sample_rate,
                buffer: buffer.sample_rate(),
            });
        }
        if !(1..=8).contains(&buffer.channels()) {
            return Err(LoudnessError::InvalidChannelCount(buffer.channels()));
        }

        let mut ebur128 = EbuR128::new(
            u32::from(buffer.channels()),
            self.sample_rate.as_hz(),
            mode,
        )?;
        if !buffer.is_empty() {
            ebur128.add_frames_f32(buffer.samples())?;
        }
        Ok(ebur128)
    }
}
