//! Resolution engine: turns several requirement files into one pinned,
//! optionally verified set of versions.
//!
//! [`Orchestrator`] drives a run end to end and reports everything through
//! an event stream; the strategies in [`strategy`] do the actual work.

pub mod conflict;
pub mod options;
pub mod orchestrator;
pub mod phase;
pub mod selector;
pub mod strategy;

pub use conflict::{Conflict, ConflictList};
pub use options::ResolveOptions;
pub use orchestrator::Orchestrator;
pub use strategy::StrategyKind;
