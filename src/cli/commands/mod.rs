//! CLI command implementations

pub mod checkout;
pub mod config;
pub mod key;
pub mod repo_checkout;
pub mod stats;

pub use checkout::execute as checkout;
pub use config::execute as config;
pub use key::execute as key;
pub use repo_checkout::execute as repo_checkout;
pub use stats::execute as stats;

use crate::cache::{ArchiveCache, IndexClient};
use crate::config::Config;
use crate::vcs::{CloneCache, VcsCheckout};
use std::sync::Arc;

/// Single-repo checkout restoring missing working copies from the clone cache
fn clone_checkout(config: &Config, cache: Arc<dyn ArchiveCache>) -> VcsCheckout {
    VcsCheckout::new(CloneCache {
        client: cache,
        namespace: config.cache.clone_namespace.clone(),
        branch: config.cache.clone_branch.clone(),
    })
}

fn index_client(config: &Config) -> Arc<IndexClient> {
    Arc::new(IndexClient::new(&config.cache))
}
