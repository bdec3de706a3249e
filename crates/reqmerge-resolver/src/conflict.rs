//! Conflict reporting for a resolution run.

use std::fmt;

use reqmerge_core::package::PackageName;

/// Why a run could not produce a usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// No published version satisfies the merged constraint.
    NoCompatibleVersion(PackageName),
    /// Strategy-specific failure, e.g. a manifest that would not install.
    Failure(String),
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCompatibleVersion(name) => write!(f, "{name}"),
            Self::Failure(reason) => f.write_str(reason),
        }
    }
}

/// All conflicts of one run, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictList {
    conflicts: Vec<Conflict>,
}

impl ConflictList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
    }

    pub fn no_compatible_version(&mut self, name: PackageName) {
        self.add(Conflict::NoCompatibleVersion(name));
    }

    pub fn failure(&mut self, reason: impl Into<String>) {
        self.add(Conflict::Failure(reason.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Conflict> {
        self.conflicts.iter()
    }

    /// Packages that had no acceptable version.
    pub fn packages(&self) -> impl Iterator<Item = &PackageName> {
        self.conflicts.iter().filter_map(|c| match c {
            Conflict::NoCompatibleVersion(name) => Some(name),
            Conflict::Failure(_) => None,
        })
    }
}

impl FromIterator<Conflict> for ConflictList {
    fn from_iter<I: IntoIterator<Item = Conflict>>(iter: I) -> Self {
        Self {
            conflicts: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ConflictList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.conflicts.iter().map(Conflict::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}
