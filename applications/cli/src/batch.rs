//! Batch normalization
//!
//! One sequential pass over an input directory: decode, measure, solve gain,
//! write 24-bit WAV, then ask the [`FormatBridge`] for a compressed copy.
//! Anything that goes wrong with a single file lands in that file's
//! [`FileOutcome`]; only run-level problems (missing input directory, output
//! directory that cannot be created) return an error.

use crate::error::Result;
use crate::report::{
    AnalysisEntry, AnalysisReport, BatchReport, DerivativeStatus, FailureStage, FileFailure,
    FileOutcome, FileResult, NormalizedFile,
};
use sonance_audio::{FileScanner, PcmBitDepth, SymphoniaDecoder, WavEncoder};
use sonance_core::{AudioBuffer, SampleRate};
use sonance_loudness::{GainSolver, LoudnessMeter, NormalizationTarget};
use sonance_transcode::{AudioFormat, FormatBridge};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Normalizes every audio file in a directory to one target
///
/// Meters are cached per sample rate and built on first use, so a batch
/// that mixes 44.1 kHz and 48 kHz material builds exactly two.
pub struct BatchNormalizer<B> {
    target: NormalizationTarget,
    output_dir: PathBuf,
    bridge: B,
    derivative_format: Option<AudioFormat>,
    decoder: SymphoniaDecoder,
    encoder: WavEncoder,
    scanner: FileScanner,
    meters: HashMap<SampleRate, LoudnessMeter>,
}

impl<B: FormatBridge> BatchNormalizer<B> {
    /// Create a normalizer writing 24-bit WAV plus MP3 derivatives to `output_dir`
    pub fn new(target: NormalizationTarget, output_dir: impl Into<PathBuf>, bridge: B) -> Self {
        Self {
            target,
            output_dir: output_dir.into(),
            bridge,
            derivative_format: Some(AudioFormat::Mp3),
            decoder: SymphoniaDecoder::new(),
            encoder: WavEncoder::with_bit_depth(PcmBitDepth::Int24),
            scanner: FileScanner::new(),
            meters: HashMap::new(),
        }
    }

    /// Compressed derivative format; `None` writes only the lossless file
    ///
    /// `Wav` is accepted but never handed to the bridge, since its path is
    /// the lossless output's; each file then reports a failed derivative.
    pub fn with_derivative_format(mut self, format: Option<AudioFormat>) -> Self {
        self.derivative_format = format;
        self
    }

    pub fn target(&self) -> &NormalizationTarget {
        &self.target
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Sample rates a meter has been built for so far
    pub fn meter_rates(&self) -> Vec<SampleRate> {
        let mut rates: Vec<_> = self.meters.keys().copied().collect();
        rates.sort();
        rates
    }

    /// Normalize every supported file directly inside `input_dir`
    pub async fn run(&mut self, input_dir: &Path) -> Result<BatchReport> {
        let files = self.scanner.scan_directory(input_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;

        info!(
            "Normalizing {} file(s) from {} to {:.1} LUFS (ceiling {:.2})",
            files.len(),
            input_dir.display(),
            self.target.target_lufs(),
            self.target.peak_ceiling()
        );

        let mut report = BatchReport::new(self.derivative_format);
        let mut stems = HashSet::new();

        for path in files {
            let stem = output_stem(&path);
            if !stems.insert(stem.clone()) {
                warn!(
                    "{} shares its name with an earlier file; outputs for {} will be overwritten",
                    path.display(),
                    stem
                );
            }

            let result = self.process_file(&path, &stem).await;
            report.outcomes.push(FileOutcome {
                input: path,
                result,
            });
        }

        info!(
            lossless = report.lossless_written(),
            derivatives = report.derivatives_written(),
            failed = report.files_seen() - report.lossless_written(),
            "Batch finished"
        );
        Ok(report)
    }

    /// Measure every supported file in `input_dir` without writing anything
    pub fn analyze(&mut self, input_dir: &Path) -> Result<AnalysisReport> {
        let files = self.scanner.scan_directory(input_dir)?;
        let mut report = AnalysisReport::default();

        for path in files {
            let result = self
                .decoder
                .decode(&path)
                .map_err(|e| FileFailure::new(FailureStage::Decode, e))
                .and_then(|buffer| {
                    meter_for(&mut self.meters, buffer.sample_rate())
                        .and_then(|meter| meter.analyze(&buffer))
                        .map_err(|e| FileFailure::new(FailureStage::Measure, e))
                });

            match &result {
                Ok(info) => info!("{}: {}", path.display(), info),
                Err(failure) => warn!(
                    "{}: {} failed: {}",
                    path.display(),
                    failure.stage,
                    failure.message
                ),
            }

            report.entries.push(AnalysisEntry {
                input: path,
                result,
            });
        }

        Ok(report)
    }

    async fn process_file(&mut self, path: &Path, stem: &str) -> FileResult {
        let mut buffer = match self.decoder.decode(path) {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return FileResult::Failed(FileFailure::new(FailureStage::Decode, e));
            }
        };

        let levels = match self.normalize_buffer(&mut buffer) {
            Ok(levels) => levels,
            Err(e) => {
                warn!("Cannot measure {}: {}", path.display(), e);
                return FileResult::Failed(FileFailure::new(FailureStage::Measure, e));
            }
        };

        let lossless = self.output_dir.join(format!("{}.wav", stem));
        if let Err(e) = self.encoder.encode(&buffer, &lossless) {
            warn!("Cannot write {}: {}", lossless.display(), e);
            return FileResult::Failed(FileFailure::new(FailureStage::Encode, e));
        }
        drop(buffer);

        if levels.silent {
            info!("{}: silent, passed through unchanged", path.display());
        } else if levels.unmeasurable {
            info!(
                "{}: too short or quiet to measure, passed through unchanged",
                path.display()
            );
        } else {
            info!(
                "{}: {:.1} LUFS -> {:.1} LUFS{}",
                path.display(),
                levels.before,
                levels.after,
                if levels.peak_limited { " (peak limited)" } else { "" }
            );
        }

        let derivative = match self.derivative_format {
            Some(format) => self.write_derivative(&lossless, stem, format).await,
            None => DerivativeStatus::Disabled,
        };

        FileResult::Normalized(NormalizedFile {
            before_lufs: levels.before,
            after_lufs: levels.after,
            gain: levels.gain,
            peak_limited: levels.peak_limited,
            silent: levels.silent,
            unmeasurable: levels.unmeasurable,
            lossless,
            derivative,
        })
    }

    /// Measure, apply the solved gain in place, and re-measure
    fn normalize_buffer(&mut self, buffer: &mut AudioBuffer) -> sonance_loudness::Result<Levels> {
        let meter = meter_for(&mut self.meters, buffer.sample_rate())?;

        let before = meter.measure(buffer)?;
        let plan = GainSolver::plan(
            before,
            self.target.target_lufs(),
            buffer,
            self.target.peak_ceiling(),
        );
        buffer.apply_gain(plan.gain);

        // Peak limiting can leave the result short of the target
        let after = if plan.silent {
            before
        } else {
            meter.measure(buffer)?
        };

        // The gate also rejects audible clips shorter than one block
        let digital_silence = plan.silent && buffer.is_digital_silence();

        Ok(Levels {
            before,
            after,
            gain: plan.gain,
            peak_limited: plan.peak_limited,
            silent: digital_silence,
            unmeasurable: plan.silent && !digital_silence,
        })
    }

    async fn write_derivative(
        &self,
        lossless: &Path,
        stem: &str,
        format: AudioFormat,
    ) -> DerivativeStatus {
        let output = self
            .output_dir
            .join(format!("{}.{}", stem, format.extension()));

        // A WAV derivative would land on the lossless output itself
        if output == lossless {
            warn!(
                "Not writing a {} derivative over {}",
                format,
                lossless.display()
            );
            return DerivativeStatus::Failed(format!(
                "{} derivative would overwrite the lossless output",
                format
            ));
        }

        match self.bridge.transcode(lossless, &output, format).await {
            Ok(()) => DerivativeStatus::Written(output),
            Err(e) => {
                warn!("No {} for {}: {}", format, lossless.display(), e);
                DerivativeStatus::Failed(e.to_string())
            }
        }
    }
}

struct Levels {
    before: f64,
    after: f64,
    gain: f64,
    peak_limited: bool,
    silent: bool,
    unmeasurable: bool,
}

fn meter_for(
    meters: &mut HashMap<SampleRate, LoudnessMeter>,
    rate: SampleRate,
) -> sonance_loudness::Result<&LoudnessMeter> {
    match meters.entry(rate) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => Ok(entry.insert(LoudnessMeter::new(rate)?)),
    }
}

fn output_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
