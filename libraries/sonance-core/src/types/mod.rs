//! Domain types shared across Sonance crates

mod audio;

pub use audio::{AudioBuffer, SampleRate};
