//! Candidate selection for one package.

use reqmerge_core::constraint::Constraint;
use reqmerge_core::package::PackageName;
use reqmerge_core::version::Version;
use reqmerge_registry::{RegistryClient, RegistryRecord};

/// Filters and orders a package's published versions.
#[derive(Debug, Clone, Copy)]
pub struct VersionSelector<'a> {
    registry: &'a RegistryClient,
    allow_prereleases: bool,
}

impl<'a> VersionSelector<'a> {
    pub fn new(registry: &'a RegistryClient, allow_prereleases: bool) -> Self {
        Self {
            registry,
            allow_prereleases,
        }
    }

    /// Acceptable versions of `name`, highest first. Empty when the package
    /// is unknown or the registry could not be reached.
    pub async fn candidates(
        &self,
        name: &PackageName,
        constraint: &Constraint,
        target_runtime: Option<&Version>,
    ) -> Vec<Version> {
        let record = self.registry.versions(name).await;
        select(&record, constraint, target_runtime, self.allow_prereleases)
    }
}

/// Apply the inclusion rules to a registry record, highest version first.
///
/// A version is kept when it parses, is a final release (unless
/// `allow_prereleases`), satisfies `constraint`, and either no target runtime
/// is given, the version declares no runtime requirement, or the target
/// satisfies it. Versions whose runtime requirement cannot be parsed are
/// dropped when a target is given.
pub fn select(
    record: &RegistryRecord,
    constraint: &Constraint,
    target_runtime: Option<&Version>,
    allow_prereleases: bool,
) -> Vec<Version> {
    let mut versions: Vec<Version> = record
        .iter()
        .filter_map(|(raw, requires)| {
            let version = Version::parse(raw).ok()?;
            if version.is_prerelease() && !allow_prereleases {
                return None;
            }
            if !constraint.contains(&version) {
                return None;
            }
            if let (Some(target), Some(requires)) = (target_runtime, requires) {
                let runtime = Constraint::parse(requires).ok()?;
                if !runtime.contains(target) {
                    return None;
                }
            }
            Some(version)
        })
        .collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup();
    versions
}
