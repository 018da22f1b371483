//! Per-file error taxonomy.
//!
//! Every variant is non-fatal to the enclosing walk: a failed file
//! contributes no rows and processing moves on to the next file.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// The source does not parse, even after the legacy-dialect rewrite.
    #[error("parse failure in {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },

    /// The legacy-dialect rewrite itself rejected the file.
    #[error("invalid source file {path}: {message}")]
    InvalidSourceFile { path: PathBuf, message: String },

    /// Any other failure while building the metric tables. Intentionally
    /// broad: heterogeneous input trades diagnosis for robustness.
    #[error("processing error in {path}: {message}")]
    Unclassified { path: PathBuf, message: String },
}

impl FileError {
    pub fn parse_failure(path: &Path, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn invalid_source(path: &Path, message: impl Into<String>) -> Self {
        Self::InvalidSourceFile {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn unclassified(path: &Path, message: impl Into<String>) -> Self {
        Self::Unclassified {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result type alias for per-file operations.
pub type FileResult<T> = std::result::Result<T, FileError>;
