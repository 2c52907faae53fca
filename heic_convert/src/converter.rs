//! Batch orchestrator.
//!
//! One run: check the source folder, prepare the output folder, discover
//! sources, then decode → encode → write each file in discovery order. A
//! per-file failure is recorded and the loop moves on; only precondition
//! failures abort the run.

use crate::config::{OutputFormat, RunConfig};
use crate::decode::{Decode, HeifDecoder};
use crate::encode::{encode_to_file, target_extension};
use crate::error::{ConvertError, FatalError};
use crate::stats::{ConversionResult, RunStatistics, SourceFile};
use shared_utils::{check_safe_to_clear, collect_files, prepare_output_dir, RunLog, HEIF_EXTENSIONS};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

const RULE: &str = "============================================================";

pub struct BatchConverter<D = HeifDecoder> {
    config: RunConfig,
    decoder: D,
}

impl BatchConverter<HeifDecoder> {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            decoder: HeifDecoder::new(),
        }
    }
}

impl<D: Decode> BatchConverter<D> {
    /// Swaps the decoder, e.g. for a different container library.
    pub fn with_decoder<E: Decode>(self, decoder: E) -> BatchConverter<E> {
        BatchConverter {
            config: self.config,
            decoder,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Executes the run with `log` as its logging sink. The sink is closed
    /// (and flushed) before this returns.
    pub fn run(&self, log: RunLog) -> Result<RunStatistics, FatalError> {
        let outcome = log.in_scope(|| {
            let started = Instant::now();
            log_configuration(&self.config);

            let result = self.execute();
            match &result {
                Ok(stats) => log_summary(stats, started),
                Err(e) => error!(error = %e, "Run aborted before conversion"),
            }
            result
        });
        log.close();
        outcome
    }

    fn execute(&self) -> Result<RunStatistics, FatalError> {
        let source_dir = self.config.source_dir();
        check_source_dir(source_dir)?;

        let output_dir = self.config.output_dir();
        if self.config.clear_output_first() {
            check_safe_to_clear(output_dir, source_dir).map_err(|reason| {
                FatalError::UnsafeOutputFolder {
                    path: output_dir.to_path_buf(),
                    reason,
                }
            })?;
        }
        let removed = prepare_output_dir(output_dir, self.config.clear_output_first())?;
        info!(output = %output_dir.display(), "Output folder ready");
        if self.config.clear_output_first() {
            if removed > 0 {
                info!(removed, "Cleared output folder");
            } else {
                info!("Output folder is already clean");
            }
        }

        let sources: Vec<SourceFile> = collect_files(source_dir, HEIF_EXTENSIONS)?
            .into_iter()
            .map(SourceFile::from_path)
            .collect();

        if sources.is_empty() {
            warn!(source = %source_dir.display(), "No HEIC/HEIF files found, nothing to do");
            return Ok(RunStatistics::new(0));
        }

        info!(count = sources.len(), "Found HEIC/HEIF file(s) to convert");
        for source in &sources {
            info!(file = %source.file_name(), "Discovered");
        }

        let mut stats = RunStatistics::new(sources.len());
        let mut claims = OutputClaims::default();

        for source in sources {
            let result = self.process_one(source, &mut claims);
            stats.record(result);
        }

        Ok(stats)
    }

    fn process_one(
        &self,
        source: SourceFile,
        claims: &mut OutputClaims,
    ) -> ConversionResult {
        let extension = target_extension(self.config.format());
        let output = source.output_path(self.config.output_dir(), extension);
        let output_name = output
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(file = %source.file_name(), output = %output_name, "Processing");

        if let Some(first) = claims.owner_of(&output) {
            let detail = format!(
                "{}: output name collision, {} was already written from {}",
                source.path.display(),
                output_name,
                first
            );
            error!(file = %source.file_name(), error = %detail, "Conversion failed");
            return ConversionResult::failure(source, detail);
        }
        claims.claim(&output, source.file_name());

        if !self.config.clear_output_first() && output.exists() {
            warn!(output = %output.display(), "Overwriting existing output file");
        }

        match self.convert(&source, &output) {
            Ok(bytes) => {
                claims.written(&output, source.file_name());
                info!(
                    file = %source.file_name(),
                    output = %output_name,
                    bytes,
                    "Saved {} file",
                    self.config.format()
                );
                ConversionResult::success(source, output, bytes)
            }
            Err(e) => {
                let stage = if e.is_decode() { "decode" } else { "encode" };
                error!(file = %source.file_name(), stage, error = %e, "Conversion failed");
                ConversionResult::failure(source, e.to_string())
            }
        }
    }

    fn convert(&self, source: &SourceFile, output: &Path) -> Result<u64, ConvertError> {
        let decoded = self.decoder.decode(&source.path)?;
        debug!(
            file = %source.file_name(),
            width = decoded.width(),
            height = decoded.height(),
            has_alpha = decoded.has_alpha(),
            exif_bytes = decoded.exif.as_ref().map_or(0, Vec::len),
            "Loaded image"
        );
        encode_to_file(&decoded, &self.config, output)
    }
}

/// Output paths taken during this run, keyed by the path as built and, once
/// written, by its canonical form. On a case-insensitive filesystem `A.png`
/// resolves to the `a.png` written earlier and is reported as taken.
#[derive(Debug, Default)]
struct OutputClaims {
    owners: HashMap<PathBuf, String>,
}

impl OutputClaims {
    fn owner_of(&self, output: &Path) -> Option<&str> {
        if let Some(owner) = self.owners.get(output) {
            return Some(owner.as_str());
        }
        let canonical = output.canonicalize().ok()?;
        self.owners.get(&canonical).map(String::as_str)
    }

    fn claim(&mut self, output: &Path, source_name: String) {
        self.owners.insert(output.to_path_buf(), source_name);
    }

    fn written(&mut self, output: &Path, source_name: String) {
        if let Ok(canonical) = output.canonicalize() {
            self.owners.entry(canonical).or_insert(source_name);
        }
    }
}

fn check_source_dir(source_dir: &Path) -> Result<(), FatalError> {
    if !source_dir.exists() {
        return Err(FatalError::SourceMissing(source_dir.to_path_buf()));
    }
    if !source_dir.is_dir() {
        return Err(FatalError::SourceNotDirectory(source_dir.to_path_buf()));
    }
    Ok(())
}

fn log_configuration(config: &RunConfig) {
    info!("{}", RULE);
    info!("HEIC Image Converter");
    info!("{}", RULE);
    info!(source = %config.source_dir().display(), "Source folder");
    info!(output = %config.output_dir().display(), "Output folder");
    info!(format = %config.format(), "Output format");
    match config.format() {
        OutputFormat::Jpg => info!(quality = config.quality().value(), "JPG quality"),
        OutputFormat::Pdf => info!(page_size = %config.page_size(), "PDF page size"),
        OutputFormat::Png => {}
    }
    info!(clear_output_first = config.clear_output_first(), "Clear output folder before run");
    info!("{}", RULE);
}

fn log_summary(stats: &RunStatistics, started: Instant) {
    info!("{}", RULE);
    info!("Conversion Summary");
    info!("{}", RULE);
    info!(
        total = stats.total,
        successful = stats.successful,
        failed = stats.failed,
        success_rate = %format!("{:.1}%", stats.success_rate()),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Complete: {} total, {} successful, {} failed",
        stats.total,
        stats.successful,
        stats.failed
    );
    info!("{}", RULE);
}
