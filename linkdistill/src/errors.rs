/// This module defines the error types for linkdistill.
///
/// # Error Classes
///
/// Errors fall into two groups that are handled very differently by the
/// extraction pipeline:
///
/// 1. **Per-file errors** (`FileNotFound`, `PermissionDenied`, `IoError`,
///    `LineTooLong`, `ResultsClosed`) are produced while a worker reads one
///    log file. The worker pool logs them and moves on to the next file:
///    ```rust,ignore
///    match extractor.extract_into(&path, &mut sink) {
///        Ok(_) => metrics.record_file_processed(),
///        Err(e) if e.is_per_file() => warn!("error processing {}: {}", path.display(), e),
///        Err(e) => error!("worker failed on {}: {}", path.display(), e),
///    }
///    ```
///
/// 2. **Fatal errors** (`ConfigError`, `Traversal`, `Output`, `Json`,
///    `Pipeline`) propagate to the caller with `?` and end the run:
///    ```rust,ignore
///    match distill(&config) {
///        Ok(summary) => // Report summary,
///        Err(DistillError::Traversal(e)) => // Input tree unreadable,
///        Err(e) => // Any other fatal error
///    }
///    ```
///
/// Use [`DistillError::is_per_file`] to tell the two apart.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for distill operations
pub type DistillResult<T> = Result<T, DistillError>;

/// Errors that can occur while distilling logs
#[derive(Error, Debug)]
pub enum DistillError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Line in {path} exceeds the maximum length of {limit} bytes")]
    LineTooLong { path: PathBuf, limit: usize },
    #[error("Results stream closed before all records were delivered")]
    ResultsClosed,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Traversal error: {0}")]
    Traversal(#[from] ignore::Error),
    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Pipeline failure: {0}")]
    Pipeline(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DistillError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn line_too_long(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self::LineTooLong {
            path: path.into(),
            limit,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Maps an error from opening or reading `path` to the most specific variant
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// Whether the error only affects a single input file
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_)
                | Self::PermissionDenied(_)
                | Self::LineTooLong { .. }
                | Self::ResultsClosed
                | Self::IoError(_)
        )
    }
}
