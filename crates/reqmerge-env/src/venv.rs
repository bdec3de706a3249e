//! Virtual environments created with `<python> -m venv <dir> --clear`.

use std::path::{Path, PathBuf};

use reqmerge_util::errors::ReqmergeError;
use reqmerge_util::process::CommandBuilder;

use crate::interpreter::Interpreter;

/// A virtual environment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    dir: PathBuf,
}

impl VirtualEnv {
    /// Create the environment at `dir`, wiping whatever was there before.
    pub async fn create(interpreter: &Interpreter, dir: &Path) -> Result<Self, ReqmergeError> {
        CommandBuilder::new(interpreter.path.to_string_lossy())
            .args(["-m", "venv"])
            .arg(dir.to_string_lossy())
            .arg("--clear")
            .exec_checked()
            .await?;
        Ok(Self::at(dir))
    }

    /// Refer to an existing environment without creating it.
    pub fn at(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The environment's own package installer.
    pub fn pip(&self) -> PathBuf {
        if cfg!(windows) {
            self.dir.join("Scripts").join("pip.exe")
        } else {
            self.dir.join("bin").join("pip")
        }
    }

    /// `pip install <spec>`.
    pub async fn install(&self, spec: &str) -> Result<(), ReqmergeError> {
        CommandBuilder::new(self.pip().to_string_lossy())
            .args(["install", spec])
            .exec_checked()
            .await?;
        Ok(())
    }

    /// `pip install -r <file>`.
    pub async fn install_requirements(&self, file: &Path) -> Result<(), ReqmergeError> {
        CommandBuilder::new(self.pip().to_string_lossy())
            .args(["install", "-r"])
            .arg(file.to_string_lossy())
            .exec_checked()
            .await?;
        Ok(())
    }
}
