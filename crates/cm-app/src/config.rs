//! Frontend configuration.

use std::path::{Path, PathBuf};

use cm_store::{DEFAULT_NAMESPACE, FileStore, Persistence};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::session::MatrixSession;

pub const DEFAULT_STORAGE_DIR: &str = ".capability-matrix";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Prefix shared by every persisted dataset key.
    pub namespace: String,
    /// Directory holding one JSON file per dataset.
    pub storage_dir: PathBuf,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

impl MatrixConfig {
    /// Load from a YAML file; a missing file gives the defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|message| AppError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_yaml_str(content: &str) -> Result<Self, String> {
        // An empty document deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let valid = !self.namespace.is_empty()
            && self
                .namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
        if valid {
            Ok(())
        } else {
            Err(format!(
                "namespace {:?} must be non-empty ASCII letters, digits, '_' or '-'",
                self.namespace
            ))
        }
    }

    /// Open the file-backed session this config points at.
    pub fn open_session(&self) -> AppResult<MatrixSession<FileStore>> {
        let backend = FileStore::new(self.storage_dir.clone())?;
        Ok(MatrixSession::open(Persistence::new(
            backend,
            self.namespace.clone(),
        )))
    }
}
