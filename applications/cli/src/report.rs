//! Per-file outcomes and run summaries.

use sonance_loudness::{linear_to_db, LoudnessInfo};
use sonance_transcode::AudioFormat;
use std::fmt;
use std::path::{Path, PathBuf};

/// Step of the per-file pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Decode,
    Measure,
    Encode,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Decode => write!(f, "decode"),
            FailureStage::Measure => write!(f, "measure"),
            FailureStage::Encode => write!(f, "encode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub stage: FailureStage,
    pub message: String,
}

impl FileFailure {
    pub fn new(stage: FailureStage, message: impl fmt::Display) -> Self {
        Self {
            stage,
            message: message.to_string(),
        }
    }
}

/// What happened to the compressed copy of a normalized file
#[derive(Debug, Clone, PartialEq)]
pub enum DerivativeStatus {
    Written(PathBuf),
    Failed(String),
    /// Derivatives are turned off for this run
    Disabled,
}

/// A file that was normalized and written losslessly
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFile {
    pub before_lufs: f64,
    pub after_lufs: f64,
    pub gain: f64,
    pub peak_limited: bool,
    /// Passed through unchanged because every sample is zero
    pub silent: bool,
    /// Passed through unchanged: audible, but too short or quiet to gate
    pub unmeasurable: bool,
    pub lossless: PathBuf,
    pub derivative: DerivativeStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileResult {
    Normalized(NormalizedFile),
    Failed(FileFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: FileResult,
}

impl FileOutcome {
    pub fn name(&self) -> String {
        display_name(&self.input)
    }

    fn normalized(&self) -> Option<&NormalizedFile> {
        match &self.result {
            FileResult::Normalized(file) => Some(file),
            FileResult::Failed(_) => None,
        }
    }

    fn failed_at(&self, stage: FailureStage) -> bool {
        matches!(&self.result, FileResult::Failed(f) if f.stage == stage)
    }
}

/// Results of one normalization pass, in processing order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    /// Compressed format requested for this run (`None` when disabled)
    pub derivative_format: Option<AudioFormat>,
}

impl BatchReport {
    pub fn new(derivative_format: Option<AudioFormat>) -> Self {
        Self {
            outcomes: Vec::new(),
            derivative_format,
        }
    }

    pub fn files_seen(&self) -> usize {
        self.outcomes.len()
    }

    /// Files written to the lossless container
    pub fn lossless_written(&self) -> usize {
        self.outcomes.iter().filter_map(FileOutcome::normalized).count()
    }

    pub fn derivatives_written(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(FileOutcome::normalized)
            .filter(|f| matches!(f.derivative, DerivativeStatus::Written(_)))
            .count()
    }

    pub fn bridge_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(FileOutcome::normalized)
            .filter(|f| matches!(f.derivative, DerivativeStatus::Failed(_)))
            .count()
    }

    pub fn decode_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.failed_at(FailureStage::Decode))
            .count()
    }

    pub fn measure_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.failed_at(FailureStage::Measure))
            .count()
    }

    pub fn encode_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.failed_at(FailureStage::Encode))
            .count()
    }

    pub fn silent_files(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(FileOutcome::normalized)
            .filter(|f| f.silent)
            .count()
    }

    pub fn unmeasurable_files(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(FileOutcome::normalized)
            .filter(|f| f.unmeasurable)
            .count()
    }

    pub fn peak_limited_files(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(FileOutcome::normalized)
            .filter(|f| f.peak_limited)
            .count()
    }

    /// True when every file was normalized and every requested derivative written
    pub fn is_clean(&self) -> bool {
        self.lossless_written() == self.files_seen() && self.bridge_failures() == 0
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn fmt_lufs(lufs: f64) -> String {
    if lufs.is_finite() {
        format!("{:.1} LUFS", lufs)
    } else {
        "silent".to_string()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            let name = outcome.name();
            match &outcome.result {
                FileResult::Normalized(file) if file.silent => {
                    writeln!(f, "{}: silent, passed through unchanged", name)?;
                }
                FileResult::Normalized(file) if file.unmeasurable => {
                    writeln!(
                        f,
                        "{}: too short or quiet to measure, passed through unchanged",
                        name
                    )?;
                }
                FileResult::Normalized(file) => {
                    write!(
                        f,
                        "{}: {} -> {} (gain {:+.1} dB",
                        name,
                        fmt_lufs(file.before_lufs),
                        fmt_lufs(file.after_lufs),
                        linear_to_db(file.gain)
                    )?;
                    if file.peak_limited {
                        write!(f, ", peak limited")?;
                    }
                    writeln!(f, ")")?;
                }
                FileResult::Failed(failure) => {
                    writeln!(f, "{}: {} failed: {}", name, failure.stage, failure.message)?;
                }
            }

            if let FileResult::Normalized(NormalizedFile {
                derivative: DerivativeStatus::Failed(message),
                ..
            }) = &outcome.result
            {
                let ext = self
                    .derivative_format
                    .map_or("derivative", |format| format.extension());
                writeln!(f, "  {} not written: {}", ext, message)?;
            }
        }

        writeln!(f)?;
        write!(f, "Converted {} file(s) to WAV", self.lossless_written())?;
        if let Some(format) = self.derivative_format {
            write!(
                f,
                ", {} to {}",
                self.derivatives_written(),
                format.extension().to_uppercase()
            )?;
        }
        writeln!(f, " ({} seen)", self.files_seen())?;

        let mut problems = Vec::new();
        for (count, label) in [
            (self.decode_failures(), "decode failure(s)"),
            (self.measure_failures(), "measure failure(s)"),
            (self.encode_failures(), "encode failure(s)"),
            (self.bridge_failures(), "bridge failure(s)"),
            (self.silent_files(), "silent file(s)"),
            (self.unmeasurable_files(), "unmeasurable file(s)"),
            (self.peak_limited_files(), "peak limited"),
        ] {
            if count > 0 {
                problems.push(format!("{} {}", count, label));
            }
        }
        if !problems.is_empty() {
            write!(f, "{}", problems.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisEntry {
    pub input: PathBuf,
    pub result: Result<LoudnessInfo, FileFailure>,
}

/// Measurements from an analyze pass; nothing is written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub entries: Vec<AnalysisEntry>,
}

impl AnalysisReport {
    pub fn measured(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let name = display_name(&entry.input);
            match &entry.result {
                Ok(info) => writeln!(f, "{}: {}", name, info)?,
                Err(failure) => {
                    writeln!(f, "{}: {} failed: {}", name, failure.stage, failure.message)?
                }
            }
        }
        write!(f, "{} measured, {} failed", self.measured(), self.failed())
    }
}
