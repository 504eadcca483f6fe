//! Sound-generation client.

use crate::config::ClipGeneratorConfig;
use crate::error::{ClipError, Result};
use crate::prompts::{PromptList, PromptSpec};
use reqwest::Client;
use serde::Serialize;
use sonance_transcode::{AudioFormat, BridgeError, FormatBridge};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Generates clips one prompt at a time.
///
/// Every prompt is attempted; a failed request or conversion is recorded in
/// the [`ClipReport`] and the run moves on to the next prompt. Nothing is
/// retried.
pub struct ClipGenerator<B> {
    http: Client,
    config: ClipGeneratorConfig,
    bridge: B,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    text: &'a str,
    duration_seconds: f64,
    prompt_influence: f64,
}

/// What happened to one prompt.
#[derive(Debug)]
pub enum ClipStatus {
    /// Clip saved and converted to WAV
    Converted { source: PathBuf, wav: PathBuf },
    /// Clip saved but the WAV conversion failed
    SavedOnly { source: PathBuf, error: BridgeError },
    /// No clip was saved
    Failed(ClipError),
}

#[derive(Debug)]
pub struct ClipOutcome {
    pub name: String,
    pub status: ClipStatus,
}

/// Per-prompt results of a generation run, in prompt order.
#[derive(Debug, Default)]
pub struct ClipReport {
    pub outcomes: Vec<ClipOutcome>,
}

impl ClipReport {
    /// Prompts whose audio reached disk
    pub fn saved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, ClipStatus::Failed(_)))
            .count()
    }

    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ClipStatus::Converted { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ClipStatus::Failed(_)))
            .count()
    }
}

impl fmt::Display for ClipReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                ClipStatus::Converted { wav, .. } => {
                    writeln!(f, "{}: saved {}", outcome.name, wav.display())?
                }
                ClipStatus::SavedOnly { source, error } => writeln!(
                    f,
                    "{}: saved {} (conversion failed: {})",
                    outcome.name,
                    source.display(),
                    error
                )?,
                ClipStatus::Failed(error) => writeln!(f, "{}: failed ({})", outcome.name, error)?,
            }
        }
        write!(
            f,
            "{} saved, {} converted, {} failed",
            self.saved(),
            self.converted(),
            self.failed()
        )
    }
}

impl<B: FormatBridge> ClipGenerator<B> {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: ClipGeneratorConfig, bridge: B) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Sonance/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            bridge,
        })
    }

    pub fn config(&self) -> &ClipGeneratorConfig {
        &self.config
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Generate every prompt in order.
    pub async fn generate(&self, prompts: &PromptList) -> ClipReport {
        let mut report = ClipReport::default();

        if let Err(e) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            warn!(
                "Cannot create output directory {}: {}",
                self.config.output_dir.display(),
                e
            );
            let reason = e.to_string();
            for prompt in prompts.iter() {
                report.outcomes.push(ClipOutcome {
                    name: prompt.name.clone(),
                    status: ClipStatus::Failed(ClipError::Io(std::io::Error::new(
                        e.kind(),
                        reason.clone(),
                    ))),
                });
            }
            return report;
        }

        for prompt in prompts.iter() {
            let status = self.generate_one(prompt).await;
            report.outcomes.push(ClipOutcome {
                name: prompt.name.clone(),
                status,
            });
        }

        info!(
            saved = report.saved(),
            converted = report.converted(),
            failed = report.failed(),
            "Clip generation finished"
        );
        report
    }

    async fn generate_one(&self, prompt: &PromptSpec) -> ClipStatus {
        info!(
            "Requesting '{}' ({}s, influence {:.0}%)",
            prompt.name,
            prompt.duration_seconds,
            prompt.prompt_influence * 100.0
        );

        let source = self.clip_path(&prompt.name, self.config.source_extension());

        let audio = match self.request(prompt).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Generation failed for '{}': {}", prompt.name, e);
                return ClipStatus::Failed(e);
            }
        };

        if let Err(e) = tokio::fs::write(&source, &audio).await {
            warn!("Cannot write {}: {}", source.display(), e);
            return ClipStatus::Failed(ClipError::Io(e));
        }
        info!("Saved {} ({} bytes)", source.display(), audio.len());

        // Endpoint already returned WAV
        if AudioFormat::from_extension(self.config.source_extension()) == Some(AudioFormat::Wav) {
            return ClipStatus::Converted {
                wav: source.clone(),
                source,
            };
        }

        let wav = self.clip_path(&prompt.name, AudioFormat::Wav.extension());
        match self.bridge.transcode(&source, &wav, AudioFormat::Wav).await {
            Ok(()) => ClipStatus::Converted { source, wav },
            Err(error) => {
                warn!("Conversion failed for '{}': {}", prompt.name, error);
                ClipStatus::SavedOnly { source, error }
            }
        }
    }

    async fn request(&self, prompt: &PromptSpec) -> Result<Vec<u8>> {
        let body = GenerationRequest {
            text: &prompt.text,
            duration_seconds: prompt.duration_seconds,
            prompt_influence: prompt.prompt_influence,
        };

        debug!(endpoint = %self.config.endpoint, name = %prompt.name, "Sending generation request");

        let response = self
            .http
            .post(&self.config.endpoint)
            .query(&[("output_format", self.config.output_format.as_str())])
            .header("xi-api-key", self.config.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClipError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn clip_path(&self, name: &str, extension: &str) -> PathBuf {
        Path::new(&self.config.output_dir).join(format!("{}.{}", name.trim(), extension))
    }
}
