//! Drives one resolution run from manifests to a terminal event.
//!
//! See [`crate::phase`] for the phases a run moves through. Whatever
//! happens, the run ends with exactly one `Complete` event.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use futures_util::FutureExt;
use tokio::task::JoinHandle;

use reqmerge_core::config::{GlobalConfig, ToolsConfig};
use reqmerge_core::event::{self, EventSink, EventStream};
use reqmerge_core::pins::write_pins;
use reqmerge_core::store::CacheStore;
use reqmerge_env::EnvironmentVerifier;
use reqmerge_registry::RegistryClient;

use crate::options::ResolveOptions;
use crate::phase::{enter, Outcome, Phase};
use crate::strategy::{Resolution, ResolveContext, StrategyKind};

pub const MSG_SUCCESS: &str = "Resolution successful!";
pub const MSG_CONFLICTS: &str = "Resolution failed due to conflicts.";
pub const MSG_NO_SOLUTION: &str = "Resolution failed: No solution found.";
pub const MSG_VERIFY_FAILED: &str = "Resolution succeeded, but test environment failed.";
pub const MSG_UNEXPECTED: &str = "Resolution failed with an unexpected error.";

/// Long-lived resolution engine: registry access, cache location and tools.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: RegistryClient,
    store: CacheStore,
    tools: ToolsConfig,
    jobs: usize,
}

impl Orchestrator {
    pub fn new(registry: RegistryClient, store: CacheStore, tools: ToolsConfig) -> Self {
        Self {
            registry,
            store,
            tools,
            jobs: 1,
        }
    }

    /// Registry prefetch width; `1` keeps lookups sequential.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Build an engine from the global configuration.
    pub fn from_config(config: &GlobalConfig) -> miette::Result<Self> {
        let store = CacheStore::new(config.cache.path());
        let registry = RegistryClient::from_config(&config.registry, store.clone())?;
        Ok(Self::new(registry, store, config.tools.clone()).with_jobs(config.registry.jobs))
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Run on a spawned task; the returned stream carries its events.
    pub fn start(
        self,
        manifests: Vec<PathBuf>,
        strategy: StrategyKind,
        options: ResolveOptions,
    ) -> (JoinHandle<bool>, EventStream) {
        let (sink, stream) = event::channel();
        let handle =
            tokio::spawn(async move { self.run(&manifests, strategy, &options, sink).await });
        (handle, stream)
    }

    /// Run to completion, reporting on `sink`. Returns the success flag of the
    /// final `Complete` event.
    pub async fn run(
        &self,
        manifests: &[PathBuf],
        strategy: StrategyKind,
        options: &ResolveOptions,
        sink: EventSink,
    ) -> bool {
        sink.log(format!(
            "--- Starting resolution with algorithm: {strategy} ---"
        ));
        if !strategy.merges_manifests() {
            enter(Phase::Resolving(strategy), &sink);
        }

        let ctx = ResolveContext {
            strategy,
            manifests,
            sink: &sink,
            options,
            registry: &self.registry,
            store: &self.store,
            tools: &self.tools,
            jobs: self.jobs,
        };
        let attempt = AssertUnwindSafe(self.guarded(strategy, &ctx))
            .catch_unwind()
            .await;

        let resolution = match attempt {
            Ok(Ok(resolution)) => resolution,
            Ok(Err(e)) => {
                tracing::error!(error = ?e, %strategy, "strategy failed");
                sink.log(format!(
                    "An unexpected error occurred in '{strategy}' resolver: {e}"
                ));
                return finish(sink, Outcome::Error, MSG_UNEXPECTED);
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!(%reason, %strategy, "strategy panicked");
                sink.log(format!(
                    "An unexpected error occurred in '{strategy}' resolver: {reason}"
                ));
                return finish(sink, Outcome::Error, MSG_UNEXPECTED);
            }
        };

        if !resolution.conflicts.is_empty() {
            let unsatisfiable: Vec<&str> =
                resolution.conflicts.packages().map(|p| p.as_str()).collect();
            tracing::warn!(?unsatisfiable, total = resolution.conflicts.len(), "conflicts");
            sink.log(format!("Conflicts found for: {}", resolution.conflicts));
            return finish(sink, Outcome::Conflict, MSG_CONFLICTS);
        }

        if !strategy.produces_pins() {
            sink.log(format!("Algorithm '{strategy}' completed successfully."));
            return finish(sink, Outcome::Success, MSG_SUCCESS);
        }

        if resolution.resolved.is_empty() {
            sink.log("Algorithm failed to find a valid set of packages.");
            return finish(sink, Outcome::Conflict, MSG_NO_SOLUTION);
        }

        if options.verify {
            enter(Phase::Verifying, &sink);
            let verifier = EnvironmentVerifier::new(self.store.clone(), self.tools.python.clone());
            let installed = verifier
                .verify(&resolution.resolved, options.target_runtime.as_ref(), &sink)
                .await;
            if !installed {
                return finish(sink, Outcome::Conflict, MSG_VERIFY_FAILED);
            }
        }

        enter(Phase::Writing, &sink);
        if let Err(e) = write_pins(&options.output, &resolution.resolved) {
            tracing::error!(error = ?e, "failed to write pins");
            sink.log(format!("Failed to write '{}': {e}", options.output.display()));
            return finish(sink, Outcome::Error, MSG_UNEXPECTED);
        }
        sink.log(format!(
            "Successfully created '{}'",
            options.output.display()
        ));
        sink.data(resolution.resolved);
        finish(sink, Outcome::Success, MSG_SUCCESS)
    }

    async fn guarded(
        &self,
        strategy: StrategyKind,
        ctx: &ResolveContext<'_>,
    ) -> miette::Result<Resolution> {
        self.store.ensure()?;
        strategy.resolve(ctx).await
    }
}

fn finish(sink: EventSink, outcome: Outcome, message: &str) -> bool {
    enter(Phase::Done(outcome), &sink);
    let success = outcome == Outcome::Success;
    sink.complete(message, success);
    success
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
