//! Normalization target configuration

use crate::error::{LoudnessError, Result};
use crate::{DEFAULT_PEAK_CEILING, DEFAULT_TARGET_LUFS};

/// Target loudness and peak ceiling for a batch run
///
/// The ceiling is a linear amplitude in `(0, 1]`; zero is rejected because the
/// resulting gain would have to be zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationTarget {
    target_lufs: f64,
    peak_ceiling: f64,
}

impl NormalizationTarget {
    /// Create a validated target
    pub fn new(target_lufs: f64, peak_ceiling: f64) -> Result<Self> {
        if !target_lufs.is_finite() {
            return Err(LoudnessError::InvalidTarget(format!(
                "target loudness must be finite, got {}",
                target_lufs
            )));
        }
        if !(peak_ceiling > 0.0 && peak_ceiling <= 1.0) {
            return Err(LoudnessError::InvalidTarget(format!(
                "peak ceiling must be in (0, 1], got {}",
                peak_ceiling
            )));
        }
        Ok(Self {
            target_lufs,
            peak_ceiling,
        })
    }

    /// Target integrated loudness in LUFS
    pub fn target_lufs(&self) -> f64 {
        self.target_lufs
    }

    /// Maximum absolute sample value after normalization
    pub fn peak_ceiling(&self) -> f64 {
        self.peak_ceiling
    }

    /// Peak ceiling in dBFS
    pub fn peak_ceiling_dbfs(&self) -> f64 {
        crate::gain::linear_to_db(self.peak_ceiling)
    }
}

impl Default for NormalizationTarget {
    fn default() -> Self {
        Self {
            target_lufs: DEFAULT_TARGET_LUFS,
            peak_ceiling: DEFAULT_PEAK_CEILING,
        }
    }
}
