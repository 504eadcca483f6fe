/// Output formats the bridge knows how to request from the encoder
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Ogg,
    Opus,
    Flac,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Opus => "opus",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            "opus" => Some(AudioFormat::Opus),
            "flac" => Some(AudioFormat::Flac),
            "wav" | "wave" => Some(AudioFormat::Wav),
            _ => None,
        }
    }

    /// Lossy formats get a bitrate/quality argument
    pub fn is_lossy(&self) -> bool {
        matches!(self, AudioFormat::Mp3 | AudioFormat::Ogg | AudioFormat::Opus)
    }

    /// FFmpeg output arguments (codec, rate control, container)
    pub(crate) fn ffmpeg_args(&self, bitrate_kbps: u32) -> Vec<String> {
        let bitrate = format!("{}k", bitrate_kbps);
        let args: Vec<&str> = match self {
            AudioFormat::Mp3 => vec!["-c:a", "libmp3lame", "-b:a", bitrate.as_str(), "-f", "mp3"],
            AudioFormat::Ogg => vec!["-c:a", "libvorbis", "-b:a", bitrate.as_str(), "-f", "ogg"],
            AudioFormat::Opus => vec!["-c:a", "libopus", "-b:a", bitrate.as_str(), "-f", "opus"],
            AudioFormat::Flac => vec!["-c:a", "flac", "-f", "flac"],
            AudioFormat::Wav => vec!["-c:a", "pcm_s16le", "-f", "wav"],
        };
        args.into_iter().map(String::from).collect()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| format!("unknown format {:?} (expected mp3, ogg, opus, flac or wav)", s))
    }
}
