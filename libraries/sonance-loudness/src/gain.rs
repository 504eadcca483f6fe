//! Peak-safe normalization gain
//!
//! The solver turns a loudness measurement into the linear gain that reaches the target level,
//! then pulls that gain back if it would push the buffer's largest sample past the ceiling.
//! Loudness accuracy is traded for zero clipping.

use sonance_core::AudioBuffer;

/// Convert decibels to a linear amplitude factor
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude factor to decibels (negative infinity for zero)
pub fn linear_to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Result of solving for a normalization gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainPlan {
    /// Final linear gain to apply
    pub gain: f64,
    /// Gain the loudness difference asked for, before peak limiting (0 dB when silent)
    pub requested_gain_db: f64,
    /// The ceiling forced the gain below the requested value
    pub peak_limited: bool,
    /// The measurement carried no usable level; gain is a no-op
    pub silent: bool,
}

impl GainPlan {
    fn unity(silent: bool) -> Self {
        Self {
            gain: 1.0,
            requested_gain_db: 0.0,
            peak_limited: false,
            silent,
        }
    }

    /// Final gain in dB
    pub fn gain_db(&self) -> f64 {
        linear_to_db(self.gain)
    }
}

/// Computes loudness normalization gain with a peak ceiling
///
/// Deterministic and stateless.
///
/// # Example
///
/// ```ignore
/// use sonance_loudness::GainSolver;
///
/// // -20 LUFS measured, -12 LUFS wanted, never exceed 0.95
/// let gain = GainSolver::solve(-20.0, -12.0, &buffer, 0.95);
/// buffer.apply_gain(gain);
/// ```
pub struct GainSolver;

impl GainSolver {
    /// Linear gain that moves `measured_lufs` to `target_lufs` without the peak exceeding `peak_ceiling`
    pub fn solve(
        measured_lufs: f64,
        target_lufs: f64,
        buffer: &AudioBuffer,
        peak_ceiling: f64,
    ) -> f64 {
        Self::plan(measured_lufs, target_lufs, buffer, peak_ceiling).gain
    }

    /// Same as [`GainSolver::solve`] but reports how the gain was reached
    pub fn plan(
        measured_lufs: f64,
        target_lufs: f64,
        buffer: &AudioBuffer,
        peak_ceiling: f64,
    ) -> GainPlan {
        Self::plan_for_peak(
            measured_lufs,
            target_lufs,
            f64::from(buffer.peak()),
            peak_ceiling,
        )
    }

    /// Solve against a precomputed buffer peak (max absolute sample)
    pub fn plan_for_peak(
        measured_lufs: f64,
        target_lufs: f64,
        buffer_peak: f64,
        peak_ceiling: f64,
    ) -> GainPlan {
        // Silence or gated-out audio: nothing to normalize
        if !measured_lufs.is_finite() {
            return GainPlan::unity(true);
        }

        let requested_gain_db = target_lufs - measured_lufs;
        let mut gain = db_to_linear(requested_gain_db);

        // 10^(dB/20) overflows for absurd differences; treat like silence
        if !gain.is_finite() || gain <= 0.0 {
            tracing::warn!(
                "Gain of {:.1} dB is out of range, leaving audio unchanged",
                requested_gain_db
            );
            return GainPlan::unity(true);
        }

        let projected_peak = buffer_peak * gain;
        let mut peak_limited = false;

        // Zero-peak buffers never reach the division
        if projected_peak > 0.0 && projected_peak > peak_ceiling {
            gain *= peak_ceiling / projected_peak;
            peak_limited = true;
        }

        GainPlan {
            gain,
            requested_gain_db,
            peak_limited,
            silent: false,
        }
    }
}
