use std::path::PathBuf;

use reqmerge_core::version::Version;

/// Per-invocation settings of a resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Where the pin file is written.
    pub output: PathBuf,
    /// Runtime the pins must support; also selects the verification interpreter.
    pub target_runtime: Option<Version>,
    /// Install the pins into a scratch environment before writing them.
    pub verify: bool,
    /// Consider pre-release and dev versions as candidates.
    pub allow_prereleases: bool,
    /// Output archive of the bundle strategy.
    pub bundle_output: PathBuf,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("requirements.merged.txt"),
            target_runtime: None,
            verify: true,
            allow_prereleases: false,
            bundle_output: PathBuf::from("bundle.pex"),
        }
    }
}
