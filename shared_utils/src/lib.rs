//! Shared Utilities for heic_convert
//!
//! - Per-run logging sink with timestamped log files
//! - Non-recursive, extension-filtered file collection
//! - Output folder lifecycle (create, clear except README.md)
//! - Safety checks before destructive folder operations
//! - Summary reporting
//! - Type-safe value wrappers

pub mod batch;
pub mod logging;
pub mod output_dir;
pub mod report;
pub mod safety;
pub mod types;

pub use batch::{collect_files, has_extension, CollectError, HEIF_EXTENSIONS};
pub use logging::{LogConfig, RunLog};
pub use output_dir::{prepare_output_dir, OutputDirError, KEEP_FILE_NAME};
pub use report::{format_bytes, format_duration, print_summary_report, SummaryReport};
pub use safety::{check_dangerous_directory, check_safe_to_clear};
pub use types::{Quality, QualityError};
