//! Depth-first search over per-package candidates with an explicit choice stack.
//!
//! Packages do not constrain each other here, so [`Backtracking::accept`]
//! never rejects and the first complete assignment is the greedy one. The
//! stack and the undo path are kept so a real compatibility check can be
//! plugged into `accept` without touching the search.

use reqmerge_core::package::PackageName;
use reqmerge_core::pins::ResolvedSet;
use reqmerge_core::version::Version;

use super::{Resolution, ResolutionStrategy, ResolveContext};
use crate::conflict::{Conflict, ConflictList};

#[derive(Debug, Clone, Copy, Default)]
pub struct Backtracking;

/// One level of the search: a package and how far through its candidates we are.
struct Frame<'a> {
    package: &'a PackageName,
    candidates: &'a [Version],
    cursor: usize,
}

impl Frame<'_> {
    fn current(&self) -> Option<&Version> {
        self.cursor.checked_sub(1).and_then(|i| self.candidates.get(i))
    }
}

impl Backtracking {
    /// Whether the partial assignment can still lead to a solution.
    fn accept(&self, _partial: &ResolvedSet) -> bool {
        true
    }

    /// Search for a full assignment; `None` when every path was rejected.
    fn search(
        &self,
        packages: &[(PackageName, Vec<Version>)],
        ctx: &ResolveContext<'_>,
    ) -> Option<ResolvedSet> {
        let mut solution = ResolvedSet::new();
        let Some((first, first_candidates)) = packages.first() else {
            return Some(solution);
        };

        ctx.sink.log(format!("Searching for {first}..."));
        let mut stack = vec![Frame {
            package: first,
            candidates: first_candidates,
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(version) = frame.candidates.get(frame.cursor) else {
                solution.remove(frame.package);
                ctx.sink.log(format!(
                    "  Backtracking from {}, no valid path found.",
                    frame.package
                ));
                stack.pop();
                continue;
            };
            frame.cursor += 1;
            solution.insert(frame.package.clone(), version.to_string());

            if !self.accept(&solution) {
                continue;
            }

            let depth = stack.len();
            match packages.get(depth) {
                Some((next, next_candidates)) => {
                    ctx.sink.log(format!("Searching for {next}..."));
                    stack.push(Frame {
                        package: next,
                        candidates: next_candidates,
                        cursor: 0,
                    });
                }
                None => {
                    for frame in stack.iter().rev() {
                        if let Some(chosen) = frame.current() {
                            ctx.sink.log(format!(
                                "  Tentatively selected {}=={chosen}",
                                frame.package
                            ));
                        }
                    }
                    return Some(solution);
                }
            }
        }
        None
    }
}

impl ResolutionStrategy for Backtracking {
    fn name(&self) -> &'static str {
        "Version Range with Backtracking"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution> {
        let merged = ctx.merged()?;
        ctx.prefetch(&merged).await;

        let selector = ctx.selector();
        let target = ctx.options.target_runtime.as_ref();
        let mut packages = Vec::with_capacity(merged.len());
        for (name, constraint) in &merged {
            let candidates = selector.candidates(name, constraint, target).await;
            packages.push((name.clone(), candidates));
        }

        let empty: ConflictList = packages
            .iter()
            .filter(|(_, candidates)| candidates.is_empty())
            .map(|(name, _)| Conflict::NoCompatibleVersion(name.clone()))
            .collect();
        if !empty.is_empty() {
            return Ok(Resolution::conflicts(empty));
        }

        match self.search(&packages, ctx) {
            Some(solution) => Ok(Resolution::resolved(solution)),
            None => Ok(Resolution::conflicts(
                packages
                    .into_iter()
                    .map(|(name, _)| Conflict::NoCompatibleVersion(name))
                    .collect(),
            )),
        }
    }
}
