//! Core data types for reqmerge.
//!
//! This crate defines what every other crate talks in: PEP 440 versions and
//! specifier constraints, package names, requirement-file parsing, the
//! cross-file merge, the pin set and its writer, the progress event channel,
//! the on-disk cache layout and the global configuration.
//!
//! Nothing here touches the network or spawns processes.

pub mod config;
pub mod constraint;
pub mod event;
pub mod manifest;
pub mod merge;
pub mod package;
pub mod pins;
pub mod store;
pub mod version;
