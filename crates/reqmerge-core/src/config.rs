use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use reqmerge_util::errors::ReqmergeError;

/// Global user configuration loaded from `~/.reqmerge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Cache location from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl CacheConfig {
    /// The cache root with `~` expanded.
    pub fn path(&self) -> PathBuf {
        reqmerge_util::fs::expand_home(&self.dir)
    }
}

fn default_cache_dir() -> String {
    "~/.reqmerge/cache".to_string()
}

/// Package index settings from `[registry]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_index_url", rename = "index-url")]
    pub index_url: String,
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,
    /// Concurrent prefetch width. `1` keeps lookups strictly sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            timeout_secs: default_timeout_secs(),
            jobs: default_jobs(),
        }
    }
}

fn default_index_url() -> String {
    "https://pypi.org/pypi".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_jobs() -> usize {
    8
}

/// External executables from `[tools]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Interpreter used when no target runtime is requested.
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_bundler")]
    pub bundler: String,
    #[serde(default = "default_solver")]
    pub solver: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            bundler: default_bundler(),
            solver: default_solver(),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_bundler() -> String {
    "pex".to_string()
}

fn default_solver() -> String {
    "conda".to_string()
}

impl GlobalConfig {
    /// Load the global configuration from `~/.reqmerge/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a specific config file.
    pub fn load_from(path: &std::path::Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReqmergeError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            ReqmergeError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the reqmerge data directory (`~/.reqmerge/`).
pub fn dirs_path() -> PathBuf {
    reqmerge_util::fs::home_dir().join(".reqmerge")
}
