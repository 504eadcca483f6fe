/// Audio decoder implementation using Symphonia
use crate::error::{AudioError, Result};
use crate::scanner::is_audio_file;
use sonance_core::{AudioBuffer, SampleRate};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Whole-file audio decoder using Symphonia
///
/// Supports: WAV, MP3, OGG (Vorbis), FLAC
///
/// The original channel layout is preserved: an N-channel file decodes to an
/// N-channel [`AudioBuffer`] of f32 samples. No clamping is applied, so float
/// sources with overs keep their true level for loudness measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Check if the decoder supports the given file format
    pub fn supports_format(&self, path: &Path) -> bool {
        is_audio_file(path)
    }

    /// Decode an entire audio file into memory
    ///
    /// # Errors
    /// `FileNotFound` when the path does not exist, `UnsupportedFormat` for
    /// an extension outside wav/mp3/ogg/flac, `Decode` for anything
    /// unreadable, corrupt, or without audio frames.
    pub fn decode(&self, path: &Path) -> Result<AudioBuffer> {
        // Check if file exists
        if !path.exists() {
            return Err(AudioError::FileNotFound(path.display().to_string()));
        }

        if !self.supports_format(path) {
            return Err(AudioError::UnsupportedFormat(path.display().to_string()));
        }

        // Open the file
        let file = std::fs::File::open(path)?;

        // Create media source
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        // Probe the media source
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::Decode(format!("Failed to probe file: {}", e)))?;

        let mut format = probed.format;

        // Find the default track
        let track = format
            .default_track()
            .ok_or_else(|| AudioError::Decode("No audio tracks found".to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16);

        // Create decoder
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Decode(format!("Failed to create decoder: {}", e)))?;

        // Decode all packets and collect into single buffer
        let mut all_samples: Vec<f32> = Vec::new();

        loop {
            // Get the next packet
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(AudioError::Decode(format!("Error reading packet: {}", e)));
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            // Decode the packet
            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    // Corrupt frames inside an otherwise valid stream are skipped
                    tracing::warn!("Skipping undecodable packet in {}: {}", path.display(), e);
                    continue;
                }
                Err(e) => {
                    return Err(AudioError::Decode(format!("Decode error: {}", e)));
                }
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count() as u16);

            // Convert whatever sample format the codec produced into interleaved f32
            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            all_samples.extend_from_slice(sample_buf.samples());
        }

        let (Some(sample_rate), Some(channels)) = (sample_rate, channels) else {
            return Err(AudioError::Decode(
                "Stream does not declare sample rate or channel layout".to_string(),
            ));
        };

        if all_samples.is_empty() {
            return Err(AudioError::Decode("No audio frames decoded".to_string()));
        }

        let buffer = AudioBuffer::new(all_samples, channels, SampleRate::new(sample_rate))?;

        tracing::debug!(
            "Decoded {}: {} frames, {} channels @ {}",
            path.display(),
            buffer.frames(),
            buffer.channels(),
            buffer.sample_rate()
        );

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_common_formats() {
        let decoder = SymphoniaDecoder::new();
        assert!(decoder.supports_format(Path::new("test.mp3")));
        assert!(decoder.supports_format(Path::new("test.flac")));
        assert!(decoder.supports_format(Path::new("test.ogg")));
        assert!(decoder.supports_format(Path::new("test.WAV")));
        assert!(!decoder.supports_format(Path::new("test.txt")));
        assert!(!decoder.supports_format(Path::new("test.m4a")));
    }

    #[test]
    fn decode_nonexistent_file_returns_error() {
        let decoder = SymphoniaDecoder::new();
        let result = decoder.decode(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(AudioError::FileNotFound(_))));
    }

    #[test]
    fn decode_garbage_returns_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        std::fs::write(&path, b"this is not a riff file at all").unwrap();

        let result = SymphoniaDecoder::new().decode(&path);
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }

    #[test]
    fn decode_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.aiff");
        std::fs::write(&path, b"FORM....AIFF").unwrap();

        let result = SymphoniaDecoder::new().decode(&path);
        assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));
    }
}
