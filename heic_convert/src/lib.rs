//! HEIC/HEIF folder batch converter.
//!
//! Converts every `.heic` / `.heif` file directly inside a source folder into
//! PNG, JPG or a single-page PDF, carrying EXIF over where the target format
//! can hold it. Per-file failures are recorded and the batch continues.
//!
//! ```no_run
//! use heic_convert::{convert_folder, OutputFormat, PageSize};
//!
//! let stats = convert_folder(
//!     "images/source",
//!     "images/output",
//!     OutputFormat::Jpg,
//!     90,
//!     PageSize::Letter,
//!     true,
//! )?;
//! println!("{} of {} converted", stats.successful, stats.total);
//! # Ok::<(), heic_convert::Error>(())
//! ```

pub mod config;
pub mod converter;
pub mod decode;
pub mod encode;
pub mod error;
pub mod stats;

pub use config::{OutputFormat, PageSize, RunConfig, RunConfigBuilder};
pub use converter::BatchConverter;
pub use decode::{Decode, DecodedImage, HeifDecoder};
pub use error::{ConfigError, ConvertError, Error, FatalError, Result};
pub use stats::{ConversionResult, Outcome, RunStatistics, SourceFile};

use shared_utils::RunLog;
use std::path::PathBuf;

/// Converts a folder programmatically, without the CLI layer.
///
/// Logs go to whatever `tracing` subscriber the caller has installed; use
/// [`BatchConverter::run`] with a [`RunLog`] to get a per-run log file.
pub fn convert_folder(
    source_dir: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    format: OutputFormat,
    quality: impl Into<i64>,
    page_size: PageSize,
    clear_output_first: bool,
) -> Result<RunStatistics> {
    let config = RunConfig::builder(source_dir, output_dir)
        .format(format)
        .quality(quality)
        .page_size(page_size)
        .clear_output_first(clear_output_first)
        .build()?;

    Ok(BatchConverter::new(config).run(RunLog::inherit())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_quality_is_a_config_error() {
        let err = convert_folder("in", "out", OutputFormat::Jpg, 0, PageSize::Letter, true)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidQuality(_))));
    }

    #[test]
    fn test_missing_source_is_fatal_not_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = convert_folder(
            dir.path().join("missing"),
            dir.path().join("out"),
            OutputFormat::Png,
            95,
            PageSize::Letter,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Fatal(FatalError::SourceMissing(_))));
    }

    #[test]
    fn test_folder_without_heic_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("src");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("photo.jpg"), b"x").unwrap();

        let stats = convert_folder(
            &source,
            dir.path().join("out"),
            OutputFormat::Pdf,
            95,
            PageSize::A4,
            true,
        )
        .unwrap();
        assert!(stats.is_nothing_to_do());
        assert!(stats.all_succeeded());
    }
}
