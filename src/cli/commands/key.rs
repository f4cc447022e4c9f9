//! Key command - show how a remote is addressed in the archive cache

use crate::cache::{derive_key, normalize, DIGEST_ALGORITHM};
use crate::cli::args::KeyArgs;
use crate::config::Config;
use crate::error::RepoCacheResult;
use console::style;

/// Execute the key command
pub async fn execute(args: KeyArgs, config: &Config) -> RepoCacheResult<()> {
    let identity = normalize(&args.remote)?;
    let branch = args
        .branch
        .unwrap_or_else(|| config.repo.default_branch.clone());
    let prefix = args
        .namespace
        .unwrap_or_else(|| config.cache.namespace.clone());
    let key = derive_key(&identity, &branch, &prefix)?;

    println!("{:<10} {}", style("identity").bold(), identity);
    println!("{:<10} {}", style("name").bold(), key.name());
    println!("{:<10} {}", style("namespace").bold(), key.namespace());
    println!(
        "{:<10} {}:{}",
        style("digest").bold(),
        DIGEST_ALGORITHM,
        key.digest()
    );

    Ok(())
}
