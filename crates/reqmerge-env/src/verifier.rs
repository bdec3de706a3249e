//! Installability check for a resolved pin set.
//!
//! Selection only ever looks at each package's own version list, so the
//! installer is the only thing that can tell whether a pin set works
//! together.

use std::path::PathBuf;

use reqmerge_core::event::EventSink;
use reqmerge_core::pins::ResolvedSet;
use reqmerge_core::store::CacheStore;
use reqmerge_core::version::Version;
use reqmerge_util::errors::ReqmergeError;

use crate::interpreter;
use crate::venv::VirtualEnv;

#[derive(Debug, Clone)]
pub struct EnvironmentVerifier {
    store: CacheStore,
    default_python: String,
}

impl EnvironmentVerifier {
    pub fn new(store: CacheStore, default_python: impl Into<String>) -> Self {
        Self {
            store,
            default_python: default_python.into(),
        }
    }

    /// Environment directory for a runtime. Same runtime, same directory.
    pub fn env_dir(&self, target: Option<&Version>) -> PathBuf {
        let key = target.map_or_else(|| "default".to_string(), Version::to_string);
        self.store.env_dir(&format!("test_env_py{key}"))
    }

    /// Install every pin into a fresh environment; `true` only if all of them install.
    ///
    /// Failures are reported on `sink`, never returned.
    pub async fn verify(
        &self,
        resolved: &ResolvedSet,
        target: Option<&Version>,
        sink: &EventSink,
    ) -> bool {
        match self.try_verify(resolved, target, sink).await {
            Ok(()) => {
                sink.log("All dependencies installed successfully in the test environment.");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "test environment failed");
                sink.log(format!("Test environment installation failed: {e}"));
                false
            }
        }
    }

    async fn try_verify(
        &self,
        resolved: &ResolvedSet,
        target: Option<&Version>,
        sink: &EventSink,
    ) -> Result<(), ReqmergeError> {
        let python = interpreter::locate(target, &self.default_python)?;

        let dir = self.env_dir(target);
        sink.status(format!("Creating test environment in {}...", dir.display()));
        if let Some(parent) = dir.parent() {
            reqmerge_util::fs::ensure_dir(parent)?;
        }
        let env = VirtualEnv::create(&python, &dir).await?;

        for (name, version) in resolved {
            let spec = format!("{name}=={version}");
            tracing::debug!(%spec, "installing into test environment");
            env.install(&spec).await?;
        }
        Ok(())
    }
}
