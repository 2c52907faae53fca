//! Run configuration.
//!
//! A [`RunConfig`] is validated once by [`RunConfigBuilder::build`] and is
//! read-only afterwards; every component takes its options from it.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use shared_utils::Quality;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_SOURCE_DIR: &str = "images/source";
pub const DEFAULT_OUTPUT_DIR: &str = "images/output";

const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

// ============================================================================
// OutputFormat
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Pdf,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpg, OutputFormat::Pdf];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpg => "JPG",
            OutputFormat::Pdf => "PDF",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

// ============================================================================
// PageSize
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::Letter => "LETTER",
            PageSize::A4 => "A4",
        }
    }

    /// Page width and height in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::Letter => (8.5 * MM_PER_INCH, 11.0 * MM_PER_INCH),
            PageSize::A4 => (210.0, 297.0),
        }
    }

    /// Page width and height in PDF points (1/72 in).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w_mm, h_mm) = self.dimensions_mm();
        (mm_to_pt(w_mm), mm_to_pt(h_mm))
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            _ => Err(ConfigError::UnknownPageSize(s.to_string())),
        }
    }
}

// ============================================================================
// RunConfig
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    source_dir: PathBuf,
    output_dir: PathBuf,
    format: OutputFormat,
    quality: Quality,
    page_size: PageSize,
    clear_output_first: bool,
    verbose: bool,
}

impl RunConfig {
    pub fn builder(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> RunConfigBuilder {
        RunConfigBuilder::new(source_dir, output_dir)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Only meaningful for [`OutputFormat::Jpg`].
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Only meaningful for [`OutputFormat::Pdf`].
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn clear_output_first(&self) -> bool {
        self.clear_output_first
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Collects raw user input; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    format: OutputFormat,
    quality: i64,
    page_size: PageSize,
    clear_output_first: bool,
    verbose: bool,
}

impl RunConfigBuilder {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
            quality: i64::from(Quality::DEFAULT),
            page_size: PageSize::default(),
            clear_output_first: true,
            verbose: false,
        }
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn quality(mut self, quality: impl Into<i64>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn clear_output_first(mut self, clear: bool) -> Self {
        self.clear_output_first = clear;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("Source"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("Output"));
        }
        let quality = Quality::new(self.quality)?;

        Ok(RunConfig {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            format: self.format,
            quality,
            page_size: self.page_size,
            clear_output_first: self.clear_output_first,
            verbose: self.verbose,
        })
    }
}
