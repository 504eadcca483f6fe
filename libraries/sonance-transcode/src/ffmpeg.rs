/// FFmpeg-backed format bridge
use crate::{
    bridge::FormatBridge,
    error::{BridgeError, Result},
    format::AudioFormat,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default upper bound on a single encoder run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_BITRATE_KBPS: u32 = 192;

/// Runs the `ffmpeg` CLI as a child process
///
/// Each run is bounded by a timeout. The child is spawned with
/// `kill_on_drop`, so dropping an in-flight `transcode` future (timeout,
/// Ctrl-C, `select!`) also kills the encoder.
#[derive(Debug, Clone)]
pub struct FfmpegBridge {
    ffmpeg_path: PathBuf,
    timeout: Duration,
    bitrate_kbps: u32,
}

impl FfmpegBridge {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout: DEFAULT_TIMEOUT,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bitrate for lossy outputs
    pub fn with_bitrate_kbps(mut self, bitrate_kbps: u32) -> Self {
        self.bitrate_kbps = bitrate_kbps;
        self
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check that the encoder can be launched (`ffmpeg -version`)
    pub async fn probe(&self) -> Result<String> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = self.run(cmd).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    fn build_command(&self, input: &Path, output: &Path, format: AudioFormat) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y") // Overwrite output file
            .arg("-i")
            .arg(input)
            .args(format.ffmpeg_args(self.bitrate_kbps))
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Spawn, wait with timeout, and map a non-zero exit to `Failed`
    async fn run(&self, mut cmd: Command) -> Result<std::process::Output> {
        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                BridgeError::Unavailable(format!("{}: {}", self.ffmpeg_path.display(), e))
            }
            _ => BridgeError::Io(e),
        })?;

        // On timeout the child future is dropped, which kills the process
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| BridgeError::TimedOut(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BridgeError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl FormatBridge for FfmpegBridge {
    async fn transcode(&self, input: &Path, output: &Path, format: AudioFormat) -> Result<()> {
        if !input.exists() {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )));
        }

        if same_file(input, output) {
            return Err(BridgeError::OutputIsInput(output.to_path_buf()));
        }

        let cmd = self.build_command(input, output, format);
        tracing::debug!("Running {:?}", cmd.as_std());

        if let Err(e) = self.run(cmd).await {
            // Don't leave a truncated derivative behind
            if output.exists() {
                if let Err(remove_err) = tokio::fs::remove_file(output).await {
                    tracing::warn!(
                        "Failed to remove partial output {}: {}",
                        output.display(),
                        remove_err
                    );
                }
            }
            return Err(e);
        }

        tracing::info!(
            "Transcoded {} -> {} ({})",
            input.display(),
            output.display(),
            format
        );
        Ok(())
    }
}

/// Paths are compared after resolving symlinks and relative components
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
