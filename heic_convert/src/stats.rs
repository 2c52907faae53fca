//! Per-file results and run statistics.

use serde::Serialize;
use shared_utils::SummaryReport;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A discovered source file. `path` is absolute but not resolved, so a
/// symlinked source keeps its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without extension.
    pub base_name: String,
    /// Extension as found on disk, without the dot.
    pub extension: String,
}

impl SourceFile {
    pub fn from_path(path: PathBuf) -> Self {
        let path = std::path::absolute(&path).unwrap_or(path);
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            base_name,
            extension,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `<output_dir>/<base_name>.<extension>`
    pub fn output_path(&self, output_dir: &Path, extension: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", self.base_name, extension))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    Success { output: PathBuf, bytes: u64 },
    Failure { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub source: SourceFile,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ConversionResult {
    pub fn success(source: SourceFile, output: PathBuf, bytes: u64) -> Self {
        Self {
            source,
            outcome: Outcome::Success { output, bytes },
        }
    }

    pub fn failure(source: SourceFile, error: impl Into<String>) -> Self {
        Self {
            source,
            outcome: Outcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match &self.outcome {
            Outcome::Success { output, .. } => Some(output),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn output_bytes(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Success { bytes, .. } => Some(bytes),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error),
        }
    }
}

/// Aggregate of a run. Results keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<ConversionResult>,
}

impl RunStatistics {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            results: Vec::with_capacity(total),
            ..Default::default()
        }
    }

    pub fn record(&mut self, result: ConversionResult) {
        if result.is_success() {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// No source files were found; not an error.
    pub fn is_nothing_to_do(&self) -> bool {
        self.total == 0
    }

    pub fn is_complete(&self) -> bool {
        self.successful + self.failed == self.total && self.results.len() == self.total
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.successful as f64 / self.total as f64) * 100.0
        }
    }

    pub fn output_bytes(&self) -> u64 {
        self.results.iter().filter_map(|r| r.output_bytes()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn to_report(&self, duration: Duration, log_file: Option<PathBuf>) -> SummaryReport {
        SummaryReport {
            total: self.total,
            succeeded: self.successful,
            failed: self.failed,
            output_bytes: self.output_bytes(),
            duration,
            log_file,
            errors: self
                .failures()
                .map(|r| (r.source.path.clone(), r.error().unwrap_or_default().to_string()))
                .collect(),
        }
    }
}
