//! Integration tests for sonance-loudness
//!
//! Tests include:
//! - Property-based tests with proptest
//! - Meter + solver round trips on synthetic signals

use proptest::prelude::*;
use sonance_core::{AudioBuffer, SampleRate};
use sonance_loudness::{
    db_to_linear, is_silent, GainSolver, LoudnessMeter, NormalizationTarget,
};

// ========== Helper Functions ==========

/// Generate a sine wave at specified amplitude and frequency
fn generate_sine(
    sample_rate: u32,
    channels: u16,
    frequency: f32,
    amplitude: f32,
    duration_secs: f32,
) -> AudioBuffer {
    let num_frames = (sample_rate as f32 * duration_secs) as usize;
    let mut samples = Vec::with_capacity(num_frames * channels as usize);

    for i in 0..num_frames {
        let t = i as f32 / sample_rate as f32;
        let sample = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
        for _ in 0..channels {
            samples.push(sample);
        }
    }

    AudioBuffer::new(samples, channels, SampleRate::new(sample_rate)).unwrap()
}

/// Generate deterministic white noise at a given peak amplitude
fn generate_noise(sample_rate: u32, channels: u16, amplitude: f32, duration_secs: f32) -> AudioBuffer {
    let num_frames = (sample_rate as f32 * duration_secs) as usize;
    let mut samples = Vec::with_capacity(num_frames * channels as usize);

    // Simple LCG for reproducible noise
    let mut seed: u64 = 12345;
    for _ in 0..num_frames {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let random = ((seed >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0;
        for _ in 0..channels {
            samples.push(random * amplitude);
        }
    }

    AudioBuffer::new(samples, channels, SampleRate::new(sample_rate)).unwrap()
}

fn normalize(buffer: &AudioBuffer, target: &NormalizationTarget) -> (AudioBuffer, f64) {
    let meter = LoudnessMeter::new(buffer.sample_rate()).unwrap();
    let measured = meter.measure(buffer).unwrap();
    let gain = GainSolver::solve(measured, target.target_lufs(), buffer, target.peak_ceiling());
    (buffer.with_gain(gain), gain)
}

// ========== Property-Based Tests ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The scaled buffer never exceeds the ceiling
    #[test]
    fn solver_never_clips(
        measured in -70.0_f64..0.0,
        target in -30.0_f64..0.0,
        peak in 0.0001_f64..1.0,
        ceiling in 0.1_f64..=1.0,
    ) {
        let plan = GainSolver::plan_for_peak(measured, target, peak, ceiling);
        prop_assert!(plan.gain > 0.0);
        prop_assert!(peak * plan.gain <= ceiling + 1e-9,
            "peak {} * gain {} exceeds ceiling {}", peak, plan.gain, ceiling);
    }

    /// Limiting only ever reduces the gain the loudness difference asked for
    #[test]
    fn limiting_only_reduces_gain(
        measured in -70.0_f64..0.0,
        target in -30.0_f64..0.0,
        peak in 0.0001_f64..1.0,
        ceiling in 0.1_f64..=1.0,
    ) {
        let plan = GainSolver::plan_for_peak(measured, target, peak, ceiling);
        let requested = db_to_linear(target - measured);
        prop_assert!(plan.gain <= requested * (1.0 + 1e-12));
        if plan.peak_limited {
            prop_assert!((peak * plan.gain - ceiling).abs() < 1e-9);
        }
    }

    /// Uniform amplitude measured exactly at target yields unity
    #[test]
    fn at_target_is_unity(level in -40.0_f64..-3.0, amplitude in 0.01_f32..0.9) {
        let buffer = AudioBuffer::new(vec![amplitude; 256], 1, SampleRate::CD_QUALITY).unwrap();
        let gain = GainSolver::solve(level, level, &buffer, 1.0);
        prop_assert!((gain - 1.0).abs() < 1e-9);
    }

    /// Scaled buffers stay within the ceiling after f32 rounding
    #[test]
    fn applied_gain_respects_ceiling(
        amplitude in 0.01_f32..1.0,
        measured in -60.0_f64..-1.0,
        ceiling in 0.2_f64..=1.0,
    ) {
        let buffer = AudioBuffer::new(vec![amplitude, -amplitude, amplitude * 0.5], 1, SampleRate::CD_QUALITY).unwrap();
        let gain = GainSolver::solve(measured, -6.0, &buffer, ceiling);
        let scaled = buffer.with_gain(gain);
        prop_assert!(f64::from(scaled.peak()) <= ceiling + 1e-6);
    }
}

// ========== Scenario Tests ==========

#[test]
fn test_loud_buffer_clamps_to_ceiling() {
    // Measured -20 LUFS, target -12 LUFS, ceiling 0.95, raw gain would put the peak at 1.2
    let raw_gain = db_to_linear(8.0);
    let peak = (1.2 / raw_gain) as f32;
    let buffer = AudioBuffer::new(vec![peak, -peak * 0.5, 0.0], 1, SampleRate::CD_QUALITY).unwrap();

    let plan = GainSolver::plan(-20.0, -12.0, &buffer, 0.95);
    assert!(plan.peak_limited);
    assert!(plan.gain < raw_gain);

    let scaled = buffer.with_gain(plan.gain);
    assert!((f64::from(scaled.peak()) - 0.95).abs() < 1e-6);
}

#[test]
fn test_sine_reaches_target() {
    let target = NormalizationTarget::new(-18.0, 1.0).unwrap();
    let buffer = generate_sine(48000, 2, 997.0, 0.05, 3.0);

    let (normalized, gain) = normalize(&buffer, &target);
    assert!(gain > 1.0);

    let meter = LoudnessMeter::new(SampleRate::DVD_QUALITY).unwrap();
    let after = meter.measure(&normalized).unwrap();
    assert!(
        (after - (-18.0)).abs() < 0.1,
        "Expected -18 LUFS after normalization, got {:.2}",
        after
    );
}

#[test]
fn test_renormalization_is_idempotent() {
    let target = NormalizationTarget::new(-16.0, 0.95).unwrap();
    let buffer = generate_noise(44100, 2, 0.05, 2.0);

    let (once, _) = normalize(&buffer, &target);
    let (_, second_gain) = normalize(&once, &target);

    assert!(
        (second_gain - 1.0).abs() < 0.01,
        "Second pass should be ~unity, got {}",
        second_gain
    );
}

#[test]
fn test_limited_renormalization_is_idempotent() {
    // Loud target forces the ceiling; the second pass must not push past it again
    let target = NormalizationTarget::new(-3.0, 0.5).unwrap();
    let buffer = generate_noise(44100, 1, 0.1, 2.0);

    let (once, _) = normalize(&buffer, &target);
    assert!((f64::from(once.peak()) - 0.5).abs() < 1e-4);

    let (twice, second_gain) = normalize(&once, &target);
    assert!((second_gain - 1.0).abs() < 1e-3);
    assert!(f64::from(twice.peak()) <= 0.5 + 1e-4);
}

#[test]
fn test_silence_round_trip() {
    let target = NormalizationTarget::default();
    let silence = AudioBuffer::silence(44100, 2, SampleRate::CD_QUALITY).unwrap();

    let (normalized, gain) = normalize(&silence, &target);
    assert_eq!(gain, 1.0);
    assert_eq!(normalized, silence);

    let meter = LoudnessMeter::new(SampleRate::CD_QUALITY).unwrap();
    assert!(is_silent(meter.measure(&normalized).unwrap()));
}

#[test]
fn test_meters_differ_by_rate() {
    let at_44 = generate_sine(44100, 2, 1000.0, 0.2, 2.0);
    let at_48 = generate_sine(48000, 2, 1000.0, 0.2, 2.0);

    let meter_44 = LoudnessMeter::new(SampleRate::CD_QUALITY).unwrap();
    let meter_48 = LoudnessMeter::new(SampleRate::DVD_QUALITY).unwrap();

    assert!(meter_44.measure(&at_48).is_err());
    let a = meter_44.measure(&at_44).unwrap();
    let b = meter_48.measure(&at_48).unwrap();
    assert!((a - b).abs() < 0.2);
}
