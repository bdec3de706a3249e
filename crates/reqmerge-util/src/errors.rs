use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all reqmerge operations.
///
/// Variants mirror the failure taxonomy of a resolution run. Only some of them
/// are fatal: manifest warnings and registry failures are recovered from locally
/// and reported as log lines instead of aborting the run.
#[derive(Debug, Error, Diagnostic)]
pub enum ReqmergeError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requirement line could not be understood.
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Each line must look like `name` or `name>=1.0,<2.0`"))]
    Manifest { message: String },

    /// The package index could not be reached or returned an error.
    #[error("Registry unavailable for '{package}': {message}")]
    RegistryUnavailable { package: String, message: String },

    /// No published version satisfies the merged constraint.
    #[error("No compatible version found for '{package}'")]
    NoCompatibleVersion { package: String },

    /// A required external program is not installed.
    #[error("External tool '{tool}' not found")]
    #[diagnostic(help("Install it or make sure it is on your PATH"))]
    ExternalToolMissing { tool: String },

    /// An external program ran but exited unsuccessfully.
    #[error("'{tool}' failed: {stderr}")]
    ExternalToolFailure { tool: String, stderr: String },

    /// Invalid global configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.reqmerge/config.toml for syntax errors"))]
    Config { message: String },

    /// Catch-all for failures nobody expected.
    #[error("{message}")]
    Unexpected { message: String },
}
