//! Disposable runtime environments: locating interpreters, creating
//! virtual environments and checking that a pin set really installs.

pub mod interpreter;
pub mod venv;
pub mod verifier;

pub use verifier::EnvironmentVerifier;
