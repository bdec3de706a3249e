use std::path::Path;

use reqmerge_env::interpreter;
use reqmerge_env::venv::VirtualEnv;
use reqmerge_util::errors::ReqmergeError;

use super::{Resolution, ResolutionStrategy, ResolveContext};
use crate::conflict::ConflictList;

/// Installs each manifest into its own environment; nothing is merged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolatedPerFile;

impl IsolatedPerFile {
    async fn install_file(ctx: &ResolveContext<'_>, path: &Path) -> Result<(), ReqmergeError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "requirements".to_string());
        let dir = ctx.store.env_dir(&format!("iso_env_{stem}"));

        let python = interpreter::locate(ctx.options.target_runtime.as_ref(), &ctx.tools.python)?;
        reqmerge_util::fs::ensure_dir(&ctx.store.envs_dir())?;
        let env = VirtualEnv::create(&python, &dir).await?;
        env.install_requirements(path).await
    }
}

impl ResolutionStrategy for IsolatedPerFile {
    fn name(&self) -> &'static str {
        "Per-File Isolated Environments"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>) -> miette::Result<Resolution> {
        let mut failures = ConflictList::new();
        for path in ctx.manifests {
            let file = reqmerge_util::fs::display_name(path);
            ctx.sink
                .log(format!("--- Creating isolated environment for {file} ---"));
            match Self::install_file(ctx, path).await {
                Ok(()) => ctx.sink.log(format!(
                    "Success: Environment for {file} created and installed."
                )),
                Err(e) => {
                    tracing::warn!(%file, error = %e, "isolated environment failed");
                    ctx.sink
                        .log(format!("Failed to create/install env for {file}: {e}"));
                    failures.failure(file);
                }
            }
        }
        Ok(Resolution::conflicts(failures))
    }
}
