/// Application configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sonance_clipgen::{ClipGeneratorConfig, DEFAULT_ENDPOINT, DEFAULT_OUTPUT_FORMAT};
use sonance_loudness::{NormalizationTarget, DEFAULT_PEAK_CEILING, DEFAULT_TARGET_LUFS};
use sonance_transcode::{AudioFormat, FfmpegBridge};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "sonance.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_normalize")]
    pub normalize: NormalizeSettings,

    #[serde(default = "default_transcode")]
    pub transcode: TranscodeSettings,

    #[serde(default = "default_clipgen")]
    pub clipgen: ClipgenSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NormalizeSettings {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_target_lufs")]
    pub target_lufs: f64,

    #[serde(default = "default_peak_ceiling")]
    pub peak_ceiling: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeSettings {
    /// Produce a compressed derivative next to each lossless file
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_derivative_format")]
    pub derivative_format: AudioFormat,

    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipgenSettings {
    /// Usually supplied through `ELEVENLABS_API_KEY` rather than a file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_output_format")]
    pub output_format: String,

    #[serde(default = "default_clip_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_prompts_file")]
    pub prompts_file: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `sonance.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`AppConfig::load`], reading variables from `env` instead of the process environment
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (SONANCE_NORMALIZE__TARGET_LUFS, ...)
        settings = settings.add_source(
            config::Environment::with_prefix("SONANCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.normalization_target()?;

        if self.transcode.enabled {
            if self.transcode.derivative_format == AudioFormat::Wav {
                return Err(CliError::Config(
                    "Derivative format cannot be wav (the lossless output is already WAV)"
                        .to_string(),
                ));
            }

            if self.transcode.timeout_secs == 0 {
                return Err(CliError::Config(
                    "Transcode timeout must be at least 1 second".to_string(),
                ));
            }

            if self.transcode.derivative_format.is_lossy() && self.transcode.bitrate_kbps == 0 {
                return Err(CliError::Config("Bitrate must be positive".to_string()));
            }
        }

        if same_dir(&self.normalize.input_dir, &self.normalize.output_dir) {
            return Err(CliError::Config(format!(
                "Output directory {} must differ from the input directory",
                self.normalize.output_dir.display()
            )));
        }

        Ok(())
    }

    pub fn normalization_target(&self) -> Result<NormalizationTarget> {
        Ok(NormalizationTarget::new(
            self.normalize.target_lufs,
            self.normalize.peak_ceiling,
        )?)
    }

    /// Compressed format for this run, `None` when derivatives are disabled
    pub fn derivative_format(&self) -> Option<AudioFormat> {
        self.transcode
            .enabled
            .then_some(self.transcode.derivative_format)
    }

    pub fn ffmpeg_bridge(&self) -> FfmpegBridge {
        FfmpegBridge::new(&self.transcode.ffmpeg_path)
            .with_timeout(Duration::from_secs(self.transcode.timeout_secs))
            .with_bitrate_kbps(self.transcode.bitrate_kbps)
    }

    /// Build the clip generator configuration; a missing API key is fatal here
    pub fn clip_generator_config(&self) -> Result<ClipGeneratorConfig> {
        let api_key = self
            .clipgen
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                CliError::Config("API key is required (set ELEVENLABS_API_KEY)".to_string())
            })?;

        let config = ClipGeneratorConfig::new(api_key)
            .with_endpoint(self.clipgen.endpoint.clone())
            .with_output_format(self.clipgen.output_format.clone())
            .with_output_dir(self.clipgen.output_dir.clone())
            .with_request_timeout(Duration::from_secs(self.clipgen.request_timeout_secs));
        config.validate()?;
        Ok(config)
    }
}

// Default values
fn default_normalize() -> NormalizeSettings {
    NormalizeSettings {
        input_dir: default_input_dir(),
        output_dir: default_output_dir(),
        target_lufs: default_target_lufs(),
        peak_ceiling: default_peak_ceiling(),
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input_sounds")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("normalized_sounds")
}

fn default_target_lufs() -> f64 {
    DEFAULT_TARGET_LUFS
}

fn default_peak_ceiling() -> f64 {
    DEFAULT_PEAK_CEILING
}

fn default_transcode() -> TranscodeSettings {
    TranscodeSettings {
        enabled: default_enabled(),
        ffmpeg_path: default_ffmpeg_path(),
        timeout_secs: default_timeout_secs(),
        derivative_format: default_derivative_format(),
        bitrate_kbps: default_bitrate_kbps(),
    }
}

fn default_enabled() -> bool {
    true
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_derivative_format() -> AudioFormat {
    AudioFormat::Mp3
}

fn default_bitrate_kbps() -> u32 {
    192
}

fn default_clipgen() -> ClipgenSettings {
    ClipgenSettings {
        api_key: None,
        endpoint: default_endpoint(),
        output_format: default_output_format(),
        output_dir: default_clip_output_dir(),
        prompts_file: default_prompts_file(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

fn default_clip_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_prompts_file() -> PathBuf {
    PathBuf::from("prompts.toml")
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Directory equality after resolving symlinks, or lexically when either is missing
fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => {
            let lexical = |p: &Path| {
                p.components()
                    .filter(|c| !matches!(c, std::path::Component::CurDir))
                    .collect::<PathBuf>()
            };
            lexical(a) == lexical(b)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            normalize: default_normalize(),
            transcode: default_transcode(),
            clipgen: default_clipgen(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.normalize.input_dir, PathBuf::from("input_sounds"));
        assert_eq!(config.normalize.output_dir, PathBuf::from("normalized_sounds"));
        assert_eq!(config.normalize.target_lufs, -12.0);
        assert_eq!(config.normalize.peak_ceiling, 0.95);
        assert_eq!(config.derivative_format(), Some(AudioFormat::Mp3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [normalize]
            target_lufs = -16.0

            [transcode]
            derivative_format = "ogg"
            bitrate_kbps = 160
            "#
        )
        .unwrap();

        let config = AppConfig::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.normalize.target_lufs, -16.0);
        assert_eq!(config.normalize.peak_ceiling, 0.95);
        assert_eq!(config.transcode.derivative_format, AudioFormat::Ogg);
        assert_eq!(config.transcode.bitrate_kbps, 160);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[normalize]\ntarget_lufs = -16.0").unwrap();

        let config = AppConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("SONANCE_NORMALIZE__TARGET_LUFS", "-14"),
                ("SONANCE_TRANSCODE__ENABLED", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.normalize.target_lufs, -14.0);
        assert_eq!(config.derivative_format(), None);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = AppConfig::load_with_env(Some(Path::new("/nonexistent/sonance.toml")), env(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_ceiling_rejected() {
        let mut config = AppConfig::default();
        config.normalize.peak_ceiling = 1.5;
        assert!(matches!(config.validate(), Err(CliError::Loudness(_))));
    }

    #[test]
    fn test_wav_derivative_rejected() {
        let mut config = AppConfig::default();
        config.transcode.derivative_format = AudioFormat::Wav;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        // Irrelevant when derivatives are off
        config.transcode.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_dir_must_differ_from_input() {
        let root = tempfile::tempdir().unwrap();
        let sounds = root.path().join("sounds");
        std::fs::create_dir(&sounds).unwrap();

        let mut config = AppConfig::default();
        config.normalize.input_dir = sounds.clone();
        config.normalize.output_dir = root.path().join(".").join("sounds");
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        config.normalize.input_dir = PathBuf::from("./not_created_yet");
        config.normalize.output_dir = PathBuf::from("not_created_yet");
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        config.normalize.output_dir = root.path().join("normalized");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clip_config_requires_key() {
        let config = AppConfig::default();
        match config.clip_generator_config() {
            Err(CliError::Config(msg)) => assert!(msg.contains("ELEVENLABS_API_KEY")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_clip_config_from_settings() {
        let mut config = AppConfig::default();
        config.clipgen.api_key = Some("key-123".to_string());
        config.clipgen.output_dir = PathBuf::from("clips");

        let clip = config.clip_generator_config().unwrap();
        assert_eq!(clip.api_key, "key-123");
        assert_eq!(clip.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(clip.output_dir, PathBuf::from("clips"));
        assert_eq!(clip.request_timeout, Duration::from_secs(60));
    }
}
