//! Checkout command - clone or update a single repository

use crate::cli::args::CheckoutArgs;
use crate::cli::commands::{clone_checkout, index_client};
use crate::config::Config;
use crate::error::RepoCacheResult;
use crate::vcs::{Checkout, CheckoutRequest};
use console::style;

/// Execute the checkout command
pub async fn execute(args: CheckoutArgs, config: &Config) -> RepoCacheResult<()> {
    let request = CheckoutRequest {
        dest_dir: args.directory,
        base_url: args.base_url,
        head_url: args.head.head_url,
        head_rev: args.head.head_rev,
        head_ref: args.head.head_ref,
        force_clone: args.force_clone,
        vcs: args.vcs,
    };

    let checkout = clone_checkout(config, index_client(config));
    checkout.checkout(&request).await?;

    println!("{} {}", style("✓").green(), summary(&request));

    Ok(())
}

/// Success line; names a revision only when one was requested
fn summary(request: &CheckoutRequest) -> String {
    let target = request.dest_dir.display();
    match request.head_rev.as_deref().or(request.head_ref.as_deref()) {
        Some(revision) => format!("{} at {}", target, revision),
        None => format!("{} updated from {}", target, request.head_url()),
    }
}
