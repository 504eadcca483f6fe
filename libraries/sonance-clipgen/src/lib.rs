//! Sound clip generation for Sonance
//!
//! Sends text prompts to a remote sound-generation endpoint, saves the returned
//! audio, and hands each file to a [`FormatBridge`] for conversion to WAV.
//!
//! The prompt list is plain data loaded from TOML ([`PromptList`]); credentials
//! and endpoint come in through an explicit [`ClipGeneratorConfig`] that is
//! validated before any request is made.
//!
//! # Example
//!
//! ```ignore
//! use sonance_clipgen::{ClipGenerator, ClipGeneratorConfig, PromptList};
//! use sonance_transcode::FfmpegBridge;
//!
//! let config = ClipGeneratorConfig::new(api_key).with_output_dir("clips");
//! let generator = ClipGenerator::new(config, FfmpegBridge::new("ffmpeg"))?;
//!
//! let prompts = PromptList::load("prompts.toml")?;
//! let report = generator.generate(&prompts).await;
//! println!("{}", report);
//! ```
//!
//! [`FormatBridge`]: sonance_transcode::FormatBridge

#![deny(unsafe_code)]

mod client;
mod config;
mod error;
mod prompts;

pub use client::{ClipGenerator, ClipOutcome, ClipReport, ClipStatus};
pub use config::{ClipGeneratorConfig, DEFAULT_ENDPOINT, DEFAULT_OUTPUT_FORMAT};
pub use error::{ClipError, Result};
pub use prompts::{PromptList, PromptSpec, DEFAULT_DURATION_SECONDS, DEFAULT_PROMPT_INFLUENCE};
