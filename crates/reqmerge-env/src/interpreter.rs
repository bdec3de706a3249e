//! Interpreter discovery: map a target runtime to an executable on `PATH`.

use std::path::PathBuf;

use reqmerge_core::version::Version;
use reqmerge_util::errors::ReqmergeError;
use reqmerge_util::process::find_executable;

/// A located interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// Name it was looked up by, e.g. `python3.11`.
    pub program: String,
    pub path: PathBuf,
}

/// Executable name for a runtime: `python<target>` or the configured default.
pub fn interpreter_name(target: Option<&Version>, default: &str) -> String {
    match target {
        Some(version) => format!("python{version}"),
        None => default.to_string(),
    }
}

/// Find the interpreter for `target`, or fail with [`ReqmergeError::ExternalToolMissing`].
pub fn locate(target: Option<&Version>, default: &str) -> Result<Interpreter, ReqmergeError> {
    let program = interpreter_name(target, default);
    match find_executable(&program) {
        Some(path) => {
            tracing::debug!(%program, path = %path.display(), "interpreter found");
            Ok(Interpreter { program, path })
        }
        None => Err(ReqmergeError::ExternalToolMissing { tool: program }),
    }
}
