//! Command dispatch and handler modules.

mod cache;
mod resolve;

use miette::Result;
use reqmerge_core::config::GlobalConfig;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = GlobalConfig::load()?;
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = dir.display().to_string();
    }

    match cli.command {
        Command::Resolve(args) => resolve::exec(config, args).await,
        Command::Cache { action } => cache::exec(&config, action),
    }
}
