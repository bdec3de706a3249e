//! On-disk layout of the process-wide cache root.
//!
//! ```text
//! <root>/
//!   registry/<package>.json     one document per package, never expires
//!   envs/test_env_py<runtime>   verifier environment, cleared on reuse
//!   envs/iso_env_<stem>         per-manifest isolated environments
//!   pex_wheelhouse/             bundle strategy scratch
//!   pex_combined_reqs.txt
//! ```

use std::path::{Path, PathBuf};

use reqmerge_util::errors::ReqmergeError;

use crate::package::PackageName;

/// Handle to the cache root. Constructed once per run and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.root.join("registry")
    }

    /// Cache document for one package, keyed by its normalized name.
    pub fn registry_entry(&self, name: &PackageName) -> PathBuf {
        self.registry_dir().join(format!("{name}.json"))
    }

    pub fn envs_dir(&self) -> PathBuf {
        self.root.join("envs")
    }

    /// A named environment directory under `envs/`.
    pub fn env_dir(&self, name: &str) -> PathBuf {
        self.envs_dir().join(name)
    }

    /// Create the root and its fixed subdirectories.
    pub fn ensure(&self) -> miette::Result<()> {
        for dir in [self.root.clone(), self.registry_dir(), self.envs_dir()] {
            reqmerge_util::fs::ensure_dir(&dir).map_err(ReqmergeError::Io)?;
        }
        Ok(())
    }

    /// Drop cached registry documents: all of them, or only `packages`.
    ///
    /// Returns how many documents were removed.
    pub fn clear_registry(&self, packages: &[PackageName]) -> miette::Result<usize> {
        let dir = self.registry_dir();
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        if packages.is_empty() {
            for entry in std::fs::read_dir(&dir).map_err(ReqmergeError::Io)? {
                let path = entry.map_err(ReqmergeError::Io)?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    std::fs::remove_file(&path).map_err(ReqmergeError::Io)?;
                    removed += 1;
                }
            }
        } else {
            for name in packages {
                let path = self.registry_entry(name);
                if path.is_file() {
                    std::fs::remove_file(&path).map_err(ReqmergeError::Io)?;
                    removed += 1;
                }
            }
        }
        tracing::debug!(removed, dir = %dir.display(), "cleared registry cache");
        Ok(removed)
    }
}
