//! Requirement-file parsing.
//!
//! One requirement per line: `name` optionally followed by a specifier list
//! (`requests>=2.20,<3.0`). `#` starts a comment, blank lines are ignored.
//! Lines that cannot be understood are skipped with a log event; they never
//! abort parsing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqmerge_util::errors::ReqmergeError;

use crate::constraint::Constraint;
use crate::event::EventSink;
use crate::package::PackageName;

static REQUIREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)\s*((?:[<>=!~].*)?)$").expect("requirement pattern is valid")
});

/// One parsed requirement plus where it came from.
///
/// The location is only used for diagnostics; it is dropped at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: PackageName,
    pub constraint: Constraint,
    pub source: PathBuf,
    pub line: usize,
}

/// Read and parse a requirement file into entries, in file order.
pub fn parse_entries(path: &Path, sink: &EventSink) -> miette::Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| ReqmergeError::Manifest {
        message: format!("Failed to read {}: {e}", path.display()),
    })?;
    Ok(parse_str(&content, path, sink))
}

/// Parse a requirement file into one constraint per package.
///
/// A package listed twice in the same file gets the intersection of both lines.
pub fn parse(path: &Path, sink: &EventSink) -> miette::Result<BTreeMap<PackageName, Constraint>> {
    let mut parsed: BTreeMap<PackageName, Constraint> = BTreeMap::new();
    for entry in parse_entries(path, sink)? {
        let merged = match parsed.get(&entry.name) {
            Some(existing) => existing.intersect(&entry.constraint),
            None => entry.constraint,
        };
        parsed.insert(entry.name, merged);
    }
    Ok(parsed)
}

/// Parse requirement text already in memory. `source` is used for diagnostics only.
pub fn parse_str(content: &str, source: &Path, sink: &EventSink) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        let Some(caps) = REQUIREMENT_LINE.captures(line) else {
            warn_skipped(sink, source, line_no, &format!("unrecognized requirement '{line}'"));
            continue;
        };

        match Constraint::parse(caps[2].trim()) {
            Ok(constraint) => entries.push(ManifestEntry {
                name: PackageName::new(&caps[1]),
                constraint,
                source: source.to_path_buf(),
                line: line_no,
            }),
            Err(e) => warn_skipped(sink, source, line_no, &e.to_string()),
        }
    }
    entries
}

/// Everything before the first `#`, trimmed.
pub fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or_default().trim()
}

fn warn_skipped(sink: &EventSink, source: &Path, line: usize, reason: &str) {
    let warning = ReqmergeError::Manifest {
        message: format!("{}:{line}: {reason}", source.display()),
    };
    tracing::warn!(%warning, "skipping requirement line");
    sink.log(format!("  Skipping line. {warning}"));
}
