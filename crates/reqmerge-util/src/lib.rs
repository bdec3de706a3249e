//! Shared utilities for reqmerge.
//!
//! This crate provides cross-cutting concerns used by all other reqmerge crates:
//! the unified error type, filesystem helpers, external process spawning and
//! executable lookup, and terminal status output.

pub mod errors;
pub mod fs;
pub mod process;
pub mod progress;
