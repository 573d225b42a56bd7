//! Best-effort mirroring of datasets into a key-value backend.
//!
//! Nothing here returns an error to the caller. Failed writes are logged and
//! dropped; unreadable or corrupt entries load as the supplied default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::KeyValueStore;
use crate::dataset::{DEFAULT_NAMESPACE, Dataset};
use crate::StorageResult;

pub struct Persistence<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(backend: S, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    pub fn with_default_namespace(backend: S) -> Self {
        Self::new(backend, DEFAULT_NAMESPACE)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_inner(self) -> S {
        self.backend
    }

    /// Backend key for a dataset: `"{namespace}.{dataset}"`.
    pub fn storage_key(&self, dataset: Dataset) -> String {
        format!("{}.{}", self.namespace, dataset.name())
    }

    /// Serialize and write one dataset. Returns whether the write landed.
    pub fn save<T: Serialize + ?Sized>(&mut self, dataset: Dataset, value: &T) -> bool {
        let key = self.storage_key(dataset);
        match self.try_save(&key, value) {
            Ok(()) => {
                debug!(%dataset, "dataset saved");
                true
            }
            Err(e) => {
                warn!(%dataset, error = %e, "failed to persist dataset; continuing without it");
                false
            }
        }
    }

    fn try_save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    /// Read one dataset, or `default` when it is absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, dataset: Dataset, default: T) -> T {
        let key = self.storage_key(dataset);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                warn!(%dataset, error = %e, "failed to read dataset; using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(%dataset, error = %e, "corrupt dataset; using default");
                default
            }
        }
    }

    /// Remove one dataset. Idempotent.
    pub fn purge(&mut self, dataset: Dataset) {
        let key = self.storage_key(dataset);
        if let Err(e) = self.backend.remove(&key) {
            warn!(%dataset, error = %e, "failed to purge dataset");
        }
    }

    pub fn purge_all(&mut self) {
        for dataset in Dataset::ALL {
            self.purge(dataset);
        }
    }
}
