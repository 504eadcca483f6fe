//! Loudness measurement and normalization gain for Sonance
//!
//! This crate provides:
//! - EBU R128 / ITU-R BS.1770 integrated loudness measurement (LUFS)
//! - A gain solver that moves a buffer to a target loudness without exceeding a peak ceiling
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ AudioBuffer  │ ──► │ LoudnessMeter │ ──► │ measured LUFS│
//! └──────────────┘     └───────────────┘     └──────────────┘
//!        │                                           │
//!        ▼                                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ GainSolver (target LUFS, peak ceiling) ──► linear gain    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sonance_loudness::{GainSolver, LoudnessMeter, NormalizationTarget};
//!
//! let target = NormalizationTarget::new(-12.0, 0.95)?;
//! let meter = LoudnessMeter::new(buffer.sample_rate())?;
//!
//! let measured = meter.measure(&buffer)?;
//! let gain = GainSolver::solve(measured, target.target_lufs(), &buffer, target.peak_ceiling());
//! buffer.apply_gain(gain);
//! ```

#![deny(unsafe_code)]

mod error;
mod gain;
mod meter;
mod target;

pub use error::{LoudnessError, Result};
pub use gain::{db_to_linear, linear_to_db, GainPlan, GainSolver};
pub use meter::{is_silent, LoudnessInfo, LoudnessMeter};
pub use target::NormalizationTarget;

/// Default target loudness in LUFS for batch normalization
pub const DEFAULT_TARGET_LUFS: f64 = -12.0;

/// Default peak ceiling (linear, full scale = 1.0)
pub const DEFAULT_PEAK_CEILING: f64 = 0.95;
