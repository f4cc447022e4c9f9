//! CLI argument definitions using clap derive

use crate::vcs::VcsKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// repocache - archive-cache accelerated checkouts
///
/// Restores repositories and manifest-driven workspaces from pre-packaged
/// archives, falling back to real clones only when asked to.
#[derive(Parser, Debug)]
#[command(name = "repocache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "REPOCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check out a manifest-driven workspace from cached archives
    RepoCheckout(RepoCheckoutArgs),

    /// Check out a single repository
    Checkout(CheckoutArgs),

    /// Print the cache key for a remote
    Key(KeyArgs),

    /// Show timing stats of a finished workspace checkout
    Stats(StatsArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Revision selection shared by both checkout commands
#[derive(Parser, Debug, Clone, Default)]
pub struct HeadArgs {
    /// Repository to fetch the revision from (defaults to base_url)
    pub head_url: Option<String>,

    /// Revision to check out
    pub head_rev: Option<String>,

    /// Reference to fetch before pinning head_rev
    pub head_ref: Option<String>,
}

/// Arguments for the repo-checkout command
#[derive(Parser, Debug)]
pub struct RepoCheckoutArgs {
    /// Workspace directory
    pub directory: PathBuf,

    /// Seed repository holding the workspace tooling
    pub base_url: String,

    /// Manifest to initialize the workspace from
    pub manifest: String,

    #[command(flatten)]
    pub head: HeadArgs,

    /// Namespace prefix for project archives (default: from config)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Clone projects that have no cached archive
    #[arg(long)]
    pub force_clone: bool,

    /// Manifest branch (default: from config)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Parallel jobs for the fallback sync
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Parallel archive downloads, 0 for one per project (default: from config)
    #[arg(long)]
    pub download_jobs: Option<usize>,
}

/// Arguments for the checkout command
#[derive(Parser, Debug)]
pub struct CheckoutArgs {
    /// Working copy directory
    pub directory: PathBuf,

    /// Repository to clone
    pub base_url: String,

    #[command(flatten)]
    pub head: HeadArgs,

    /// Clone when no cached copy exists
    #[arg(long)]
    pub force_clone: bool,

    /// Version control system for new working copies
    #[arg(long, value_enum, default_value_t = VcsKind::Git)]
    pub vcs: VcsKind,
}

/// Arguments for the key command
#[derive(Parser, Debug)]
pub struct KeyArgs {
    /// Remote URL in any supported form
    pub remote: String,

    /// Branch (default: from config)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Namespace prefix (default: from config)
    #[arg(long)]
    pub namespace: Option<String>,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Workspace directory
    pub directory: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the stats command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}
