//! Sonance Core
//!
//! Shared types and error handling for the Sonance loudness toolkit.
//!
//! The core crate defines:
//! - **Audio types**: [`AudioBuffer`] and [`SampleRate`]
//! - **Error handling**: [`CoreError`] and the [`Result`] alias
//!
//! # Example
//!
//! ```rust
//! use sonance_core::{AudioBuffer, SampleRate};
//!
//! // Two frames of stereo audio
//! let buffer = AudioBuffer::new(vec![0.5, -0.5, 0.25, -0.25], 2, SampleRate::DVD_QUALITY).unwrap();
//! assert_eq!(buffer.frames(), 2);
//! assert_eq!(buffer.peak(), 0.5);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{AudioBuffer, SampleRate};
