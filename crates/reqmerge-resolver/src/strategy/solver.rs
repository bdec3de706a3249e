//! Delegation to an external environment solver (conda and compatibles).
//!
//! The merged requirements are written out as an environment file, the
//! solver is run in dry-run mode and its JSON verdict decides the outcome.

use std::io::Write;

use serde::{Deserialize, Serialize};

use reqmerge_core::constraint::{Clause, Constraint, Operator};
use reqmerge_core::merge::MergedRequirements;
use reqmerge_core::version::Version;
use reqmerge_util::errors::ReqmergeError;
use reqmerge_util::process::{failure_detail, find_executable, CommandBuilder};

use super::{Resolution, ResolutionStrategy, ResolveContext};

const SOLVER_FAILED: &str = "Conda process failed";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalSolverHybrid;

/// Environment file handed to the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentDescriptor {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl EnvironmentDescriptor {
    /// `python=<runtime>` (if given), then `pip`, then every merged
    /// requirement in sorted order, with `==` pins spelled `=`.
    pub fn from_merged(merged: &MergedRequirements, target_runtime: Option<&Version>) -> Self {
        let mut specs: Vec<String> = merged
            .iter()
            .map(|(name, constraint)| format!("{name}{}", solver_spec(constraint)))
            .collect();
        specs.sort();
        specs.dedup();

        let mut dependencies = Vec::with_capacity(specs.len() + 2);
        if let Some(runtime) = target_runtime {
            dependencies.push(format!("python={runtime}"));
        }
        dependencies.push("pip".to_string());
        dependencies.extend(specs);

        Self {
            name: "resolver-env".to_string(),
            dependencies,
        }
    }

    pub fn to_yaml(&self) -> Result<String, ReqmergeError> {
        serde_yaml::to_string(self).map_err(|e| ReqmergeError::Unexpected {
            message: format!("Failed to encode environment file: {e}"),
        })
    }
}

fn solver_spec(constraint: &Constraint) -> String {
    let parts: Vec<String> = constraint.clauses().iter().map(solver_clause).collect();
    parts.join(",")
}

fn solver_clause(clause: &Clause) -> String {
    match clause.op {
        Operator::Equal => {
            let wildcard = if clause.wildcard { ".*" } else { "" };
            format!("={}{wildcard}", clause.version)
        }
        _ => clause.to_string(),
    }
}

/// The solver's `--json` answer.
#[derive(Debug, Deserialize)]
struct SolverVerdict {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl SolverVerdict {
    fn error_text(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "Unknown solver error.".to_string(),
        }
    }
}

impl ExternalSolverHybrid {
    async fn run_solver(
        ctx: &ResolveContext<'_>,
        descriptor: &EnvironmentDescriptor,
    ) -> Result<SolverVerdict, ReqmergeError> {
        let solver = ctx.tools.solver.as_str();

        let mut file = tempfile::Builder::new()
            .prefix("reqmerge-env-")
            .suffix(".yml")
            .tempfile()?;
        file.write_all(descriptor.to_yaml()?.as_bytes())?;
        file.flush()?;

        let output = CommandBuilder::new(solver)
            .args(["env", "create", "-f"])
            .arg(file.path().to_string_lossy())
            .args(["--dry-run", "--json"])
            .exec()
            .await?;

        serde_json::from_slice(&output.stdout).map_err(|e| {
            tracing::debug!(error = %e, "unreadable solver verdict");
            ReqmergeError::ExternalToolFailure {
                tool: solver.to_string(),
                stderr: failure_detail(&output),
            }
        })
    }
}

impl ResolutionStrategy for ExternalSolverHybrid {
    fn name(&self) -> &'static str {
        "Conda-First Hybrid Resolution"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution> {
        let solver = ctx.tools.solver.as_str();
        if find_executable(solver).is_none() {
            ctx.sink
                .log(format!("ERROR: '{solver}' executable not found in PATH."));
            return Ok(Resolution::failure(format!("'{solver}' not installed")));
        }

        ctx.sink
            .log(format!("Aggregating dependencies for {solver}..."));
        let merged = ctx.merged()?;
        let descriptor =
            EnvironmentDescriptor::from_merged(&merged, ctx.options.target_runtime.as_ref());

        ctx.sink
            .log(format!("Attempting to resolve with {solver} (dry-run)..."));
        match Self::run_solver(ctx, &descriptor).await {
            Ok(verdict) if verdict.success => {
                ctx.sink.log("Solver succeeded.");
                Ok(Resolution::default())
            }
            Ok(verdict) => {
                let error = verdict.error_text();
                ctx.sink.log(format!("Solver resolution failed: {error}"));
                Ok(Resolution::failure(error))
            }
            Err(e) => {
                ctx.sink.log(format!("Solver failed with an error: {e}"));
                Ok(Resolution::failure(SOLVER_FAILED))
            }
        }
    }
}
