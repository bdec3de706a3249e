use std::collections::BTreeMap;
use std::path::Path;

use reqmerge_util::errors::ReqmergeError;

use crate::package::PackageName;

/// Final pin per package. Ordered by name, which is also the output order.
pub type ResolvedSet = BTreeMap<PackageName, String>;

/// Render pins as `name==version` lines, sorted by name, newline-terminated.
pub fn render(resolved: &ResolvedSet) -> String {
    let mut out = String::new();
    for (name, version) in resolved {
        out.push_str(&format!("{name}=={version}\n"));
    }
    out
}

/// Write the pin file, replacing any existing file at `path`.
pub fn write_pins(path: &Path, resolved: &ResolvedSet) -> miette::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        reqmerge_util::fs::ensure_dir(parent).map_err(ReqmergeError::Io)?;
    }
    std::fs::write(path, render(resolved)).map_err(|e| {
        ReqmergeError::Unexpected {
            message: format!("Failed to write {}: {e}", path.display()),
        }
        .into()
    })
}
