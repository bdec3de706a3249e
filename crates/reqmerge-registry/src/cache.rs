//! On-disk registry cache: one JSON document per package.
//!
//! Documents never expire. A document that cannot be read or parsed is
//! treated as absent so the next lookup refetches it.

use std::path::PathBuf;

use reqmerge_core::package::PackageName;
use reqmerge_core::store::CacheStore;
use reqmerge_util::errors::ReqmergeError;

use crate::index::RegistryRecord;

#[derive(Debug, Clone)]
pub struct RegistryCache {
    store: CacheStore,
}

impl RegistryCache {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    pub fn path(&self, name: &PackageName) -> PathBuf {
        self.store.registry_entry(name)
    }

    /// The cached record for `name`, if a readable one exists.
    pub fn get(&self, name: &PackageName) -> Option<RegistryRecord> {
        let path = self.path(name);
        if !path.is_file() {
            return None;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(package = %name, error = %e, "unreadable registry cache entry");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(package = %name, error = %e, "corrupt registry cache entry");
                None
            }
        }
    }

    /// Store a record, replacing any previous document.
    pub fn put(&self, name: &PackageName, record: &RegistryRecord) -> miette::Result<PathBuf> {
        let dir = self.store.registry_dir();
        reqmerge_util::fs::ensure_dir(&dir).map_err(ReqmergeError::Io)?;
        let path = self.path(name);
        let json = serde_json::to_string(record).map_err(|e| ReqmergeError::Unexpected {
            message: format!("Failed to encode registry record for '{name}': {e}"),
        })?;
        std::fs::write(&path, json).map_err(ReqmergeError::Io)?;
        Ok(path)
    }
}
