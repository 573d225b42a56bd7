//! Error types for the session layer.

use std::path::PathBuf;

/// Unified error for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Cell error: {0}")]
    Core(#[from] cm_core::CoreError),

    #[error(transparent)]
    Csv(#[from] cm_csv::CsvError),

    #[error("Storage error: {0}")]
    Storage(#[from] cm_store::StorageError),

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Failed to read image file: {path}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for a rejected CSV import, the one user-facing recoverable failure.
    pub fn is_import_failure(&self) -> bool {
        matches!(self, AppError::Csv(cm_csv::CsvError::ImportFailed { .. }))
    }
}

/// Result type for cm-app operations.
pub type AppResult<T> = Result<T, AppError>;
