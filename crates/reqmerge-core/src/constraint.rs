//! Version constraints: conjunctions of PEP 440 comparison clauses.
//!
//! A [`Constraint`] keeps its clauses sorted and de-duplicated, so
//! intersection is commutative, associative and idempotent by construction:
//! `a & b`, `b & a` and `a & b & b` all compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::version::Version;

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Compatible,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Arbitrary,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Arbitrary => "===",
        }
    }

    /// Split a clause into its operator and the remaining text.
    /// Longer operators are tried first so `===` never parses as `==`.
    fn split(clause: &str) -> Option<(Self, &str)> {
        const TABLE: [(&str, Operator); 8] = [
            ("===", Operator::Arbitrary),
            ("~=", Operator::Compatible),
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            ("<=", Operator::LessEqual),
            (">=", Operator::GreaterEqual),
            ("<", Operator::Less),
            (">", Operator::Greater),
        ];
        TABLE
            .iter()
            .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a clause that is not a valid version specifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid specifier '{clause}': {reason}")]
pub struct InvalidConstraint {
    pub clause: String,
    pub reason: String,
}

/// One `(operator, version)` comparison, e.g. `>=2.20` or `!=1.4.*`.
///
/// Clauses sort by version, then operator. Equality is structural: `~=2.2`
/// and `~=2.2.0` are different clauses even though `2.2 == 2.2.0`.
#[derive(Debug, Clone)]
pub struct Clause {
    pub version: Version,
    pub op: Operator,
    /// `==1.4.*` / `!=1.4.*` prefix matching.
    pub wildcard: bool,
}

impl Clause {
    pub fn parse(text: &str) -> Result<Self, InvalidConstraint> {
        let clause = text.trim();
        let fail = |reason: &str| InvalidConstraint {
            clause: clause.to_string(),
            reason: reason.to_string(),
        };

        let (op, rest) = Operator::split(clause).ok_or_else(|| fail("missing operator"))?;
        let rest = rest.trim();
        let (version_text, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };

        if wildcard && !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(fail("wildcards are only allowed with == and !="));
        }

        let version = Version::parse(version_text).map_err(|e| fail(&e.to_string()))?;

        if op == Operator::Compatible && version.release.len() < 2 {
            return Err(fail("~= needs at least two release segments"));
        }
        if version.local.is_some()
            && !matches!(op, Operator::Equal | Operator::NotEqual | Operator::Arbitrary)
        {
            return Err(fail("local versions are only allowed with ==, != and ==="));
        }

        Ok(Self {
            version,
            op,
            wildcard,
        })
    }

    /// Exact pin `==version`.
    pub fn exact(version: Version) -> Self {
        Self {
            version,
            op: Operator::Equal,
            wildcard: false,
        }
    }

    /// Whether `candidate` satisfies this clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        let spec = &self.version;
        match self.op {
            Operator::Compatible => {
                let prefix = &spec.release[..spec.release.len().saturating_sub(1)];
                candidate.public() >= *spec && release_prefix_matches(candidate, spec.epoch, prefix)
            }
            Operator::Equal => self.equals(candidate),
            Operator::NotEqual => !self.equals(candidate),
            Operator::LessEqual => candidate.public() <= *spec,
            Operator::GreaterEqual => candidate.public() >= *spec,
            Operator::Less => {
                let c = candidate.public();
                c < *spec
                    && !(!spec.is_prerelease() && c.is_prerelease() && c.base() == spec.base())
            }
            Operator::Greater => {
                candidate > spec
                    && !(!spec.is_postrelease()
                        && candidate.is_postrelease()
                        && candidate.base() == spec.base())
                    && !(candidate.local.is_some() && candidate.base() == spec.base())
            }
            // Canonical spelling on both sides.
            Operator::Arbitrary => candidate
                .to_string()
                .eq_ignore_ascii_case(&spec.to_string()),
        }
    }

    fn equals(&self, candidate: &Version) -> bool {
        if self.wildcard {
            release_prefix_matches(candidate, self.version.epoch, &self.version.release)
        } else if self.version.local.is_some() {
            *candidate == self.version
        } else {
            candidate.public() == self.version
        }
    }
}

impl Clause {
    /// Semantic version first for a readable order, then the literal release
    /// segments, which decide prefix matching for `~=` and `.*`.
    fn key(&self) -> (&Version, Operator, bool, &[u64]) {
        (&self.version, self.op, self.wildcard, &self.version.release)
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Clause {}

impl Ord for Clause {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Clause {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `candidate` has the given epoch and its zero-padded release starts with `prefix`.
fn release_prefix_matches(candidate: &Version, epoch: u64, prefix: &[u64]) -> bool {
    if candidate.epoch != epoch {
        return false;
    }
    prefix
        .iter()
        .enumerate()
        .all(|(i, want)| candidate.release.get(i).copied().unwrap_or(0) == *want)
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

/// A conjunction of clauses. No clauses means "any version".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    /// The unconstrained constraint.
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated specifier list such as `>=2.20, <3.0`.
    ///
    /// Empty input (and empty pieces between commas) are allowed.
    pub fn parse(text: &str) -> Result<Self, InvalidConstraint> {
        let clauses = text
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(Clause::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_clauses(clauses))
    }

    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut clauses: Vec<Clause> = clauses.into_iter().collect();
        clauses.sort();
        clauses.dedup();
        Self { clauses }
    }

    /// `==version`.
    pub fn exact(version: Version) -> Self {
        Self::from_clauses([Clause::exact(version)])
    }

    /// Logical AND of both constraints.
    pub fn intersect(&self, other: &Constraint) -> Constraint {
        Self::from_clauses(self.clauses.iter().chain(&other.clauses).cloned())
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.clauses.iter().all(|c| c.contains(version))
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.clauses.iter().map(Clause::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

impl FromStr for Constraint {
    type Err = InvalidConstraint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Constraint {
        Constraint::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parses_and_displays_canonically() {
        assert_eq!(c("<3.0, >=2.20").to_string(), ">=2.20,<3.0");
        assert_eq!(c("").to_string(), "");
        assert!(c("  ").is_any());
        assert_eq!(c(">=1.0,").to_string(), ">=1.0");
    }

    #[test]
    fn intersection_laws() {
        let a = c(">=2.20");
        let b = c("<3.0");
        let d = c("!=2.25");
        assert_eq!(a.intersect(&b), b.intersect(&a));
        assert_eq!(a.intersect(&b).intersect(&d), a.intersect(&b.intersect(&d)));
        assert_eq!(a.intersect(&a), a);
        assert_eq!(a.intersect(&Constraint::any()), a);
    }

    #[test]
    fn intersection_keeps_clauses_that_differ_only_in_trailing_zeros() {
        let probes = ["2.1", "2.2", "2.2.0", "2.2.5", "2.5", "3.0"];
        let ab = c("~=2.2").intersect(&c("~=2.2.0"));
        let ba = c("~=2.2.0").intersect(&c("~=2.2"));
        assert_eq!(ab.to_string(), "~=2.2,~=2.2.0");
        assert_eq!(ab.to_string(), ba.to_string());
        for version in probes {
            assert_eq!(ab.contains(&v(version)), ba.contains(&v(version)), "{version}");
        }
        assert!(ab.contains(&v("2.2.5")));
        assert!(!ab.contains(&v("2.5")));

        let ab = c("==1.*").intersect(&c("==1.0.*"));
        let ba = c("==1.0.*").intersect(&c("==1.*"));
        assert_eq!(ab.to_string(), "==1.*,==1.0.*");
        assert_eq!(ab.to_string(), ba.to_string());
        for version in ["0.9", "1.0", "1.0.3", "1.5", "2.0"] {
            assert_eq!(ab.contains(&v(version)), ba.contains(&v(version)), "{version}");
        }
        assert!(ab.contains(&v("1.0.3")));
        assert!(!ab.contains(&v("1.5")));
    }

    #[test]
    fn arbitrary_equality_on_different_spellings_is_unsatisfiable() {
        let both = c("===1.0").intersect(&c("===1.0.0"));
        assert_eq!(both.clauses().len(), 2);
        assert!(!both.contains(&v("1.0")));
        assert!(!both.contains(&v("1.0.0")));
    }

    #[test]
    fn identical_clauses_still_collapse() {
        assert_eq!(c("~=2.2").intersect(&c("~=2.2")).to_string(), "~=2.2");
        assert_eq!(c(">=1.0").intersect(&c(">=1.0.0")).clauses().len(), 2);
    }

    #[test]
    fn range_membership() {
        let range = c(">=2.20,<3.0");
        assert!(!range.contains(&v("2.19")));
        assert!(range.contains(&v("2.20")));
        assert!(range.contains(&v("2.31")));
        assert!(!range.contains(&v("3.0")));
    }

    #[test]
    fn disjoint_range_matches_nothing() {
        let impossible = c(">=2.0").intersect(&c("<1.0"));
        for version in ["0.5", "1.0", "1.5", "2.0", "3.0"] {
            assert!(!impossible.contains(&v(version)));
        }
    }

    #[test]
    fn exact_and_wildcards() {
        assert!(c("==1.0").contains(&v("1.0.0")));
        assert!(c("==1.0").contains(&v("1.0+local")));
        assert!(!c("==1.0+a").contains(&v("1.0+b")));
        assert!(c("==1.4.*").contains(&v("1.4.7")));
        assert!(c("==1.4.*").contains(&v("1.4")));
        assert!(!c("==1.4.*").contains(&v("1.5")));
        assert!(!c("!=1.4.*").contains(&v("1.4.2")));
        assert!(c("!=1.4.*").contains(&v("1.5")));
    }

    #[test]
    fn compatible_release() {
        let spec = c("~=2.2.1");
        assert!(spec.contains(&v("2.2.1")));
        assert!(spec.contains(&v("2.2.9")));
        assert!(!spec.contains(&v("2.3.0")));
        assert!(!spec.contains(&v("2.2.0")));
        assert!(c("~=2.2").contains(&v("2.9")));
        assert!(!c("~=2.2").contains(&v("3.0")));
    }

    #[test]
    fn exclusive_bounds_skip_same_release_edge_cases() {
        assert!(!c("<2.0").contains(&v("2.0rc1")));
        assert!(c("<2.0rc2").contains(&v("2.0rc1")));
        assert!(!c(">1.0").contains(&v("1.0.post1")));
        assert!(c(">1.0.post1").contains(&v("1.0.post2")));
        assert!(!c(">1.0").contains(&v("1.0+local")));
        assert!(c(">1.0").contains(&v("1.1")));
    }

    #[test]
    fn runtime_requirement_style() {
        let requires = c(">=2.7, !=3.0.*, !=3.1.*, !=3.2.*");
        assert!(requires.contains(&v("3.11")));
        assert!(requires.contains(&v("2.7")));
        assert!(!requires.contains(&v("3.1")));
    }

    #[test]
    fn arbitrary_equality() {
        assert!(c("===1.0").contains(&v("1.0")));
        assert!(!c("===1.0").contains(&v("1.0.0")));
        assert!(c("===1.0-1").contains(&v("1.0.post1")));
        assert!(c("===1.0RC1").contains(&v("1.0rc1")));
    }

    #[test]
    fn rejects_malformed_clauses() {
        assert!(Constraint::parse(">=abc").is_err());
        assert!(Constraint::parse("1.0").is_err());
        assert!(Constraint::parse("~=1").is_err());
        assert!(Constraint::parse(">=1.*").is_err());
        assert!(Constraint::parse("<=1.0+local").is_err());
    }

    #[test]
    fn exact_pin_is_satisfied_only_by_its_version() {
        let pin = Constraint::exact(v("2.31.0"));
        assert_eq!(pin.to_string(), "==2.31.0");
        assert!(pin.contains(&v("2.31.0")));
        assert!(!pin.contains(&v("2.31.1")));
    }
}
