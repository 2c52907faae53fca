//! Error taxonomy for a conversion run.
//!
//! [`ConfigError`] and [`FatalError`] stop a run before any file is
//! converted. [`ConvertError`] is per file: it is recorded in the run
//! statistics and the batch moves on.

use shared_utils::{CollectError, OutputDirError, QualityError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid JPG {0}")]
    InvalidQuality(#[from] QualityError),

    #[error("{0} folder path is empty")]
    EmptyPath(&'static str),

    #[error("Unknown output format '{0}' (expected png, jpg or pdf)")]
    UnknownFormat(String),

    #[error("Unknown page size '{0}' (expected letter or a4)")]
    UnknownPageSize(String),
}

#[derive(Error, Debug)]
pub enum FatalError {
    #[error("Source folder does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Source path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error(transparent)]
    SourceUnreadable(#[from] CollectError),

    #[error(transparent)]
    OutputFolder(#[from] OutputDirError),

    #[error("Refusing to clear output folder {}: {reason}", path.display())]
    UnsafeOutputFolder { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConvertError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConvertError::Encode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Encode and write failures both belong to the encode stage.
    pub fn is_decode(&self) -> bool {
        matches!(self, ConvertError::Decode { .. })
    }
}

/// Errors of the programmatic entry point [`crate::convert_folder`].
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fatal(#[from] FatalError),
}

pub type Result<T> = std::result::Result<T, Error>;
