//! Sonance command-line application
//!
//! Batch loudness normalization with compressed derivatives, loudness analysis,
//! and text-prompted clip generation.
//!
//! This library exposes the orchestration pieces so they can be tested without
//! going through the binary.

pub mod batch;
pub mod config;
pub mod error;
pub mod report;

pub use batch::BatchNormalizer;
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use report::{
    AnalysisReport, BatchReport, DerivativeStatus, FailureStage, FileFailure, FileOutcome,
    FileResult, NormalizedFile,
};
