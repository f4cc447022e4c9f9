//! Configuration schema for repocache
//!
//! Configuration is stored at `~/.config/repocache/config.toml`

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Archive cache settings
    pub cache: CacheConfig,

    /// Manifest tool settings
    pub repo: RepoConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Archive cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Artifact index API root
    pub index_url: String,

    /// Queue API root serving task artifacts
    pub queue_url: String,

    /// Namespace prefix for per-project archives
    pub namespace: String,

    /// Namespace prefix for whole-repository clone archives
    pub clone_namespace: String,

    /// Branch component of clone archive keys
    pub clone_branch: String,

    /// Artifact path prefix inside a task
    pub artifact_prefix: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Concurrent archive downloads (0 = one per project)
    pub download_jobs: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            index_url: "https://index.taskcluster.net/v1".to_string(),
            queue_url: "https://queue.taskcluster.net/v1".to_string(),
            namespace: "tc-vcs.v1.repo-project".to_string(),
            clone_namespace: "tc-vcs.v1.clones".to_string(),
            clone_branch: "master".to_string(),
            artifact_prefix: "public".to_string(),
            timeout_secs: 300,
            download_jobs: 0,
        }
    }
}

/// `repo` manifest tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Launcher executable
    pub program: String,

    /// Repository the launcher bootstraps repo itself from
    pub repo_url: Option<String>,

    /// Revision of repo itself to use
    pub repo_revision: Option<String>,

    /// Manifest branch used when none is given on the command line
    pub default_branch: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            program: "repo".to_string(),
            repo_url: None,
            repo_revision: None,
            default_branch: "master".to_string(),
        }
    }
}
