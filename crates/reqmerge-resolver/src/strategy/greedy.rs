use reqmerge_core::pins::ResolvedSet;
use reqmerge_util::errors::ReqmergeError;

use super::{Resolution, ResolutionStrategy, ResolveContext};
use crate::conflict::ConflictList;

/// Highest acceptable version of every package, each decided on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl ResolutionStrategy for Greedy {
    fn name(&self) -> &'static str {
        "Greedy Latest-Compatible"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution> {
        let merged = ctx.merged()?;
        ctx.prefetch(&merged).await;

        let selector = ctx.selector();
        let target = ctx.options.target_runtime.as_ref();
        let mut resolved = ResolvedSet::new();
        let mut conflicts = ConflictList::new();

        for (name, constraint) in &merged {
            let shown = if constraint.is_any() {
                "any version".to_string()
            } else {
                constraint.to_string()
            };
            ctx.sink.log(format!("Resolving {name} ({shown})..."));

            match selector.candidates(name, constraint, target).await.first() {
                Some(best) => {
                    ctx.sink.log(format!("  Picked latest: {best}"));
                    resolved.insert(name.clone(), best.to_string());
                }
                None => {
                    let conflict = ReqmergeError::NoCompatibleVersion {
                        package: name.to_string(),
                    };
                    tracing::debug!(%conflict, %constraint);
                    ctx.sink.log("  No compatible version found.");
                    conflicts.no_compatible_version(name.clone());
                }
            }
        }

        Ok(Resolution {
            resolved,
            conflicts,
        })
    }
}
