//! CLI argument definitions for reqmerge.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqmerge_resolver::StrategyKind;

#[derive(Parser, Debug)]
#[command(
    name = "reqmerge",
    version,
    about = "Merge several requirement files into one pinned set",
    long_about = "reqmerge intersects the version constraints of several requirement files, \
                  picks one version per package from the package index, optionally checks \
                  that the result really installs, and writes a pinned requirements file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Cache directory (defaults to `[cache] dir` from ~/.reqmerge/config.toml)
    #[arg(long, global = true, env = "REQMERGE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve requirement files into one pinned file
    Resolve(ResolveArgs),

    /// Manage the registry cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Requirement files to merge
    #[arg(short = 'f', long = "file", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Output file for the pinned requirements
    #[arg(short, long, default_value = "requirements.merged.txt")]
    pub output: PathBuf,

    /// Target Python version, e.g. 3.11
    #[arg(short = 'p', long = "python")]
    pub python: Option<String>,

    /// Skip installing the result into a test environment
    #[arg(long)]
    pub no_test: bool,

    /// Resolution strategy: greedy, backtracking, isolated, bundle, solver
    #[arg(short, long, default_value = "greedy")]
    pub strategy: StrategyKind,

    /// Allow pre-release versions
    #[arg(long)]
    pub pre: bool,

    /// Output archive for the bundle strategy
    #[arg(long, default_value = "bundle.pex")]
    pub bundle_output: PathBuf,

    /// Package index base URL
    #[arg(long, env = "REQMERGE_INDEX_URL")]
    pub index_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache directory
    Path,
    /// Delete cached registry data, for all packages or only the given ones
    Clear {
        /// Packages to forget
        packages: Vec<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
