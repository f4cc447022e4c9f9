//! Single-repository checkout
//!
//! Clones or updates one working copy and pins it to a requested revision.
//! Used for the seed repository of a multi-project checkout, and on its own
//! by the `checkout` command.

mod checkout;

pub use checkout::{CloneCache, VcsCheckout};

use crate::error::RepoCacheResult;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported version-control systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    #[default]
    Git,
    #[value(name = "hg")]
    #[serde(rename = "hg")]
    Mercurial,
}

impl VcsKind {
    /// Detect the working copy type at `dir` from its metadata directory
    pub fn detect(dir: &Path) -> Option<Self> {
        if dir.join(".git").exists() {
            Some(Self::Git)
        } else if dir.join(".hg").exists() {
            Some(Self::Mercurial)
        } else {
            None
        }
    }

    /// Executable driving this VCS
    pub fn program(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Mercurial => "hg",
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Mercurial => write!(f, "hg"),
        }
    }
}

/// What to check out, and where
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    /// Working copy location
    pub dest_dir: PathBuf,
    /// Repository the working copy is cloned from
    pub base_url: String,
    /// Repository to fetch changes from (defaults to `base_url`)
    pub head_url: Option<String>,
    /// Exact revision to pin to after fetching
    pub head_rev: Option<String>,
    /// Reference to fetch (defaults to `head_rev`)
    pub head_ref: Option<String>,
    /// Allow a full clone when no cached copy exists
    pub force_clone: bool,
    /// VCS to clone with when no working copy exists yet
    pub vcs: VcsKind,
}

impl CheckoutRequest {
    pub fn head_url(&self) -> &str {
        self.head_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Reference to fetch. Some systems cannot fetch a bare revision, so a
    /// named reference can be fetched first and the revision pinned after.
    pub fn fetch_ref(&self) -> Option<&str> {
        self.head_ref.as_deref().or(self.head_rev.as_deref())
    }
}

/// Single-repository checkout interface
#[async_trait]
pub trait Checkout: Send + Sync {
    /// Materialize `request.dest_dir` at the requested revision
    async fn checkout(&self, request: &CheckoutRequest) -> RepoCacheResult<()>;
}
