//! Format bridge for Sonance
//!
//! Converting between lossless and compressed formats is delegated to an
//! external encoder. [`FormatBridge`] is the narrow seam the rest of the
//! workspace depends on; [`FfmpegBridge`] is the production implementation.
//!
//! # Example
//!
//! ```ignore
//! use sonance_transcode::{AudioFormat, FfmpegBridge, FormatBridge};
//!
//! let bridge = FfmpegBridge::new("ffmpeg");
//! bridge
//!     .transcode(Path::new("out/kick.wav"), Path::new("out/kick.mp3"), AudioFormat::Mp3)
//!     .await?;
//! ```

#![deny(unsafe_code)]

mod bridge;
mod error;
mod ffmpeg;
mod format;

pub use bridge::FormatBridge;
pub use error::{BridgeError, Result};
pub use ffmpeg::{FfmpegBridge, DEFAULT_TIMEOUT};
pub use format::AudioFormat;
