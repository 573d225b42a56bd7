use thiserror::Error;

pub type CsvResult<T> = Result<T, CsvError>;

#[derive(Error, Debug)]
pub enum CsvError {
    /// The input was rejected as a whole; nothing was applied.
    #[error("CSV import failed: {reason}")]
    ImportFailed { reason: String },

    #[error("CSV write error: {0}")]
    Write(#[from] csv::Error),

    #[error("CSV output error: {0}")]
    Output(String),
}

impl CsvError {
    pub(crate) fn import_failed(reason: impl Into<String>) -> Self {
        CsvError::ImportFailed {
            reason: reason.into(),
        }
    }
}
