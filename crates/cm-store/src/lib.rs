//! cm-store: best-effort persistence of matrix datasets in a key-value store.

pub mod backend;
pub mod dataset;
pub mod persistence;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use dataset::{DEFAULT_NAMESPACE, Dataset};
pub use persistence::Persistence;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage quota exceeded writing {key}: {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },
}
