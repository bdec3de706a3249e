//! The five resolution strategies.
//!
//! Every strategy implements [`ResolutionStrategy`]; [`StrategyKind`] is the
//! closed set a caller picks from and dispatches to the matching one.

mod backtracking;
mod bundle;
mod greedy;
mod isolated;
mod solver;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use reqmerge_core::config::ToolsConfig;
use reqmerge_core::event::EventSink;
use reqmerge_core::manifest;
use reqmerge_core::merge::{merge, MergedRequirements};
use reqmerge_core::pins::ResolvedSet;
use reqmerge_core::store::CacheStore;
use reqmerge_registry::RegistryClient;

use crate::conflict::ConflictList;
use crate::options::ResolveOptions;
use crate::phase::{enter, Phase};
use crate::selector::VersionSelector;

pub use backtracking::Backtracking;
pub use bundle::BundleExport;
pub use greedy::Greedy;
pub use isolated::IsolatedPerFile;
pub use solver::{EnvironmentDescriptor, ExternalSolverHybrid};

/// What a strategy hands back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: ResolvedSet,
    pub conflicts: ConflictList,
}

impl Resolution {
    pub fn resolved(resolved: ResolvedSet) -> Self {
        Self {
            resolved,
            conflicts: ConflictList::new(),
        }
    }

    pub fn conflicts(conflicts: ConflictList) -> Self {
        Self {
            resolved: ResolvedSet::new(),
            conflicts,
        }
    }

    /// A single free-text failure.
    pub fn failure(reason: impl Into<String>) -> Self {
        let mut conflicts = ConflictList::new();
        conflicts.failure(reason);
        Self::conflicts(conflicts)
    }
}

/// Everything a strategy may use during one run.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub strategy: StrategyKind,
    pub manifests: &'a [PathBuf],
    pub sink: &'a EventSink,
    pub options: &'a ResolveOptions,
    pub registry: &'a RegistryClient,
    pub store: &'a CacheStore,
    pub tools: &'a ToolsConfig,
    /// Registry prefetch width.
    pub jobs: usize,
}

impl<'a> ResolveContext<'a> {
    /// Parse every manifest, logging each file, and intersect the results.
    /// Moves the run through `Parsing` and `Merging` into `Resolving`.
    pub fn merged(&self) -> miette::Result<MergedRequirements> {
        enter(Phase::Parsing, self.sink);
        let mut entries = Vec::new();
        for path in self.manifests {
            self.sink.log(format!(
                "Parsing {}...",
                reqmerge_util::fs::display_name(path)
            ));
            entries.extend(manifest::parse_entries(path, self.sink)?);
        }
        enter(Phase::Merging, self.sink);
        let merged = merge(entries);
        enter(Phase::Resolving(self.strategy), self.sink);
        Ok(merged)
    }

    /// Fetch registry records for every merged package up front.
    pub async fn prefetch(&self, merged: &MergedRequirements) {
        if self.jobs > 1 {
            self.registry
                .prefetch(merged.names().cloned(), self.jobs)
                .await;
        }
    }

    pub fn selector(&self) -> VersionSelector<'a> {
        VersionSelector::new(self.registry, self.options.allow_prereleases)
    }
}

/// One way of turning manifests into a [`Resolution`].
///
/// Implementations report progress on `ctx.sink` and return conflicts as
/// data; an `Err` means something unexpected went wrong.
#[allow(async_fn_in_trait)]
pub trait ResolutionStrategy {
    /// Human-readable name used in progress messages.
    fn name(&self) -> &'static str;

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution>;
}

/// The selectable strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    #[default]
    Greedy,
    Backtracking,
    IsolatedPerFile,
    BundleExport,
    ExternalSolverHybrid,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::Greedy,
        Self::Backtracking,
        Self::IsolatedPerFile,
        Self::BundleExport,
        Self::ExternalSolverHybrid,
    ];

    /// Short name used on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Backtracking => "backtracking",
            Self::IsolatedPerFile => "isolated",
            Self::BundleExport => "bundle",
            Self::ExternalSolverHybrid => "solver",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Greedy => Greedy.name(),
            Self::Backtracking => Backtracking.name(),
            Self::IsolatedPerFile => IsolatedPerFile.name(),
            Self::BundleExport => BundleExport.name(),
            Self::ExternalSolverHybrid => ExternalSolverHybrid.name(),
        }
    }

    /// Whether a successful run ends with a pin set to verify and write.
    pub fn produces_pins(self) -> bool {
        matches!(self, Self::Greedy | Self::Backtracking)
    }

    /// Whether the strategy parses and merges the manifests before resolving.
    pub fn merges_manifests(self) -> bool {
        matches!(
            self,
            Self::Greedy | Self::Backtracking | Self::ExternalSolverHybrid
        )
    }

    pub async fn resolve(self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution> {
        match self {
            Self::Greedy => Greedy.resolve(ctx).await,
            Self::Backtracking => Backtracking.resolve(ctx).await,
            Self::IsolatedPerFile => IsolatedPerFile.resolve(ctx).await,
            Self::BundleExport => BundleExport.resolve(ctx).await,
            Self::ExternalSolverHybrid => ExternalSolverHybrid.resolve(ctx).await,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.id()).collect();
                format!("unknown strategy '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
