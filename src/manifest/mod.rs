//! Manifest-driven multi-project workspaces
//!
//! A manifest declares the projects (name, path, remote) that together form
//! a workspace. The [`ManifestTool`] trait is the contract the orchestrator
//! consumes; [`RepoTool`] implements it over the `repo` launcher.

mod repo_tool;

pub use repo_tool::RepoTool;

use crate::error::RepoCacheResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Workspace metadata directory created by manifest init
pub const METADATA_DIR: &str = ".repo";

/// One manifest-declared repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Checkout path relative to the workspace root
    pub path: String,
    /// Fetch URL of the project repository
    pub remote: String,
}

impl Project {
    /// Location of the project's object store inside a workspace
    pub fn store_path(&self, root: &Path) -> PathBuf {
        root.join(METADATA_DIR)
            .join("projects")
            .join(format!("{}.git", self.path))
    }
}

/// Options for initializing a workspace
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Manifest branch
    pub branch: String,
    /// Where the manifest tool fetches itself from
    pub repo_url: Option<String>,
    /// Which revision of the manifest tool to use
    pub repo_revision: Option<String>,
}

/// Manifest subsystem interface
#[async_trait]
pub trait ManifestTool: Send + Sync {
    /// Initialize a workspace in `dir` from `manifest`
    async fn init(&self, dir: &Path, manifest: &str, options: &InitOptions) -> RepoCacheResult<()>;

    /// List declared projects in manifest order
    async fn list_projects(&self, dir: &Path) -> RepoCacheResult<Vec<Project>>;

    /// Sync every project, at most `concurrency` at a time
    async fn sync(&self, dir: &Path, concurrency: usize) -> RepoCacheResult<()>;
}
