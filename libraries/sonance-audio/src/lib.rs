//! Audio file I/O for Sonance
//!
//! - [`SymphoniaDecoder`]: decodes WAV, MP3, OGG/Vorbis and FLAC into an in-memory [`AudioBuffer`]
//! - [`WavEncoder`]: writes lossless PCM WAV files (24-bit integer by default)
//! - [`FileScanner`]: discovers input files with a recognized extension
//!
//! [`AudioBuffer`]: sonance_core::AudioBuffer

#![deny(unsafe_code)]

mod decoder;
mod encoder;
mod error;
mod scanner;

pub use decoder::SymphoniaDecoder;
pub use encoder::{PcmBitDepth, WavEncoder};
pub use error::{AudioError, Result};
pub use scanner::{get_audio_extension, is_audio_file, FileScanner, SUPPORTED_EXTENSIONS};
