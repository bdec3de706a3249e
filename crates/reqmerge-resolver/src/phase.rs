//! Run phases, in order:
//!
//! ```text
//! Idle -> Parsing -> Merging -> Resolving(strategy) -> [Verifying] -> Writing -> Done(Success)
//!                                      \-> Done(Conflict)      \-> Done(Conflict)
//!                                      \-> Done(Error)
//! ```
//!
//! Strategies that work on raw files (isolated, bundle) go straight from
//! `Idle` to `Resolving`. Every phase except `Done` is announced as a
//! `Status` event; `Done` is the `Complete` event itself.

use std::fmt;

use reqmerge_core::event::EventSink;

use crate::strategy::StrategyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parsing,
    Merging,
    Resolving(StrategyKind),
    Verifying,
    Writing,
    Done(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Conflict,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsing => f.write_str("Parsing manifests"),
            Self::Merging => f.write_str("Merging constraints"),
            Self::Resolving(strategy) => write!(f, "Resolving with {strategy}"),
            Self::Verifying => f.write_str("Verifying in a test environment"),
            Self::Writing => f.write_str("Writing pins"),
            Self::Done(outcome) => write!(f, "Done ({outcome:?})"),
        }
    }
}

pub(crate) fn enter(phase: Phase, sink: &EventSink) {
    tracing::debug!(?phase, "entering phase");
    if !matches!(phase, Phase::Done(_)) {
        sink.status(phase.to_string());
    }
}
