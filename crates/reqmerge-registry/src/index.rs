//! The JSON package-index document (`GET {index}/{package}/json`).

use std::collections::BTreeMap;

use serde::Deserialize;

/// Published versions of one package: version string to its
/// `requires_python` specifier, if the index declares one.
///
/// This is also the exact shape of a registry cache document.
pub type RegistryRecord = BTreeMap<String, Option<String>>;

/// Only the parts of the index response that are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageIndex {
    #[serde(default)]
    pub releases: BTreeMap<String, Vec<Distribution>>,
}

/// One uploaded file of a release.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Distribution {
    #[serde(default)]
    pub packagetype: Option<String>,
    #[serde(default)]
    pub requires_python: Option<String>,
}

impl Distribution {
    pub fn is_wheel(&self) -> bool {
        self.packagetype.as_deref() == Some("bdist_wheel")
    }
}

impl PackageIndex {
    /// Collapse the index into a [`RegistryRecord`].
    ///
    /// The wheel's runtime requirement wins over the other files of a
    /// release; otherwise the first file's is used. Releases without any
    /// files are left out, and an empty requirement counts as none.
    pub fn into_record(self) -> RegistryRecord {
        self.releases
            .into_iter()
            .filter_map(|(version, dists)| {
                let chosen = dists.iter().find(|d| d.is_wheel()).or_else(|| dists.first())?;
                let requires = chosen
                    .requires_python
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string);
                Some((version, requires))
            })
            .collect()
    }
}
