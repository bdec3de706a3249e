//! Cross-manifest constraint merging.

use std::collections::BTreeMap;
use std::fmt;

use crate::constraint::Constraint;
use crate::manifest::ManifestEntry;
use crate::package::PackageName;

/// One constraint per distinct package across every manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRequirements {
    packages: BTreeMap<PackageName, Constraint>,
}

impl MergedRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// AND `constraint` into whatever is already recorded for `name`.
    pub fn add(&mut self, name: PackageName, constraint: &Constraint) {
        self.packages
            .entry(name)
            .and_modify(|existing| *existing = existing.intersect(constraint))
            .or_insert_with(|| constraint.clone());
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.packages.get(name)
    }

    /// Packages in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &Constraint)> {
        self.packages.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &PackageName> {
        self.packages.keys()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<'a> IntoIterator for &'a MergedRequirements {
    type Item = (&'a PackageName, &'a Constraint);
    type IntoIter = std::collections::btree_map::Iter<'a, PackageName, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

impl fmt::Display for MergedRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, constraint) in &self.packages {
            writeln!(f, "{name}{constraint}")?;
        }
        Ok(())
    }
}

/// Intersect every entry's constraint per package.
///
/// The result does not depend on the order of `entries`.
pub fn merge(entries: impl IntoIterator<Item = ManifestEntry>) -> MergedRequirements {
    let mut merged = MergedRequirements::new();
    for entry in entries {
        merged.add(entry.name, &entry.constraint);
    }
    merged
}
