use std::path::Path;

use reqmerge_env::interpreter;
use reqmerge_util::errors::ReqmergeError;
use reqmerge_util::process::{find_executable, CommandBuilder};

use super::{Resolution, ResolutionStrategy, ResolveContext};

/// Builds a wheelhouse for every manifest line and packs it into one
/// self-contained archive with the bundler.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleExport;

impl BundleExport {
    /// Concatenate the manifests verbatim, one after another.
    fn combine(manifests: &[impl AsRef<Path>], out: &Path) -> Result<(), ReqmergeError> {
        let mut combined = String::new();
        for path in manifests {
            let content = std::fs::read_to_string(path.as_ref())?;
            combined.push_str(&content);
            if !content.is_empty() && !content.ends_with('\n') {
                combined.push('\n');
            }
        }
        std::fs::write(out, combined)?;
        Ok(())
    }
}

impl ResolutionStrategy for BundleExport {
    fn name(&self) -> &'static str {
        "Wheelhouse + PEX Bundle"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution> {
        let bundler = ctx.tools.bundler.as_str();
        if find_executable(bundler).is_none() {
            ctx.sink
                .log(format!("ERROR: '{bundler}' executable not found in PATH."));
            return Ok(Resolution::failure(format!("'{bundler}' not installed")));
        }
        let python = match interpreter::locate(None, &ctx.tools.python) {
            Ok(python) => python,
            Err(e) => {
                ctx.sink.log(format!("ERROR: {e}"));
                return Ok(Resolution::failure(format!("'{}' not installed", ctx.tools.python)));
            }
        };

        let root = ctx.store.root();
        let wheelhouse = root.join("pex_wheelhouse");
        reqmerge_util::fs::recreate_dir(&wheelhouse).map_err(ReqmergeError::Io)?;

        ctx.sink.log("Building wheels for all requirements files...");
        let combined = root.join("pex_combined_reqs.txt");
        Self::combine(ctx.manifests, &combined)?;

        let wheels = CommandBuilder::new(python.path.to_string_lossy())
            .args(["-m", "pip", "wheel", "-r"])
            .arg(combined.to_string_lossy())
            .arg("-w")
            .arg(wheelhouse.to_string_lossy())
            .exec_checked()
            .await;
        if let Err(e) = wheels {
            ctx.sink.log(format!("Failed to build wheels: {e}"));
            return Ok(Resolution::failure("Wheel build failed"));
        }

        let output = &ctx.options.bundle_output;
        let mut cmd = CommandBuilder::new(bundler)
            .arg("--resolver-version=pip-2020-resolver")
            .arg(format!("--wheel-dir={}", wheelhouse.display()))
            .arg("-r")
            .arg(combined.to_string_lossy())
            .arg("-o")
            .arg(output.to_string_lossy())
            .arg("--no-build");
        if let Some(runtime) = &ctx.options.target_runtime {
            cmd = cmd.args(["--python".to_string(), format!("python{runtime}")]);
        }

        ctx.sink
            .log(format!("Creating bundle at {}...", output.display()));
        match cmd.exec_checked().await {
            Ok(_) => {
                ctx.sink
                    .log(format!("Bundle created successfully: {}", output.display()));
                Ok(Resolution::default())
            }
            Err(e) => {
                ctx.sink.log(format!("Bundle creation failed: {e}"));
                Ok(Resolution::failure("Bundle creation failed"))
            }
        }
    }
}
