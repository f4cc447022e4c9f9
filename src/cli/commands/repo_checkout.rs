//! Repo-checkout command - materialize a manifest-driven workspace

use crate::cli::args::RepoCheckoutArgs;
use crate::cli::commands::{clone_checkout, index_client};
use crate::config::Config;
use crate::error::RepoCacheResult;
use crate::manifest::RepoTool;
use crate::orchestration::{CheckoutPlan, CheckoutStats, Orchestrator};
use console::style;
use tracing::debug;

/// Execute the repo-checkout command
pub async fn execute(args: RepoCheckoutArgs, config: &Config) -> RepoCacheResult<()> {
    let plan = build_plan(args, config);
    debug!("Checkout plan: {:?}", plan);

    let cache = index_client(config);
    let checkout = clone_checkout(config, cache.clone());
    let manifest = RepoTool::new(config.repo.program.clone());

    let stats = Orchestrator::new(&checkout, &manifest, cache.as_ref())
        .run(&plan)
        .await?;

    println!(
        "{} Checked out {} project(s) into {}",
        style("✓").green(),
        stats.projects.len(),
        plan.dest_dir.display()
    );
    println!(
        "  {} {}",
        style("stats:").dim(),
        CheckoutStats::path(&plan.dest_dir).display()
    );

    Ok(())
}

/// Merge command-line arguments over configured defaults
fn build_plan(args: RepoCheckoutArgs, config: &Config) -> CheckoutPlan {
    let download_jobs = match args.download_jobs.unwrap_or(config.cache.download_jobs) {
        0 => None,
        n => Some(n),
    };

    CheckoutPlan {
        dest_dir: args.directory,
        base_url: args.base_url,
        manifest: args.manifest,
        head_url: args.head.head_url,
        head_rev: args.head.head_rev,
        head_ref: args.head.head_ref,
        branch: args
            .branch
            .unwrap_or_else(|| config.repo.default_branch.clone()),
        namespace: args
            .namespace
            .unwrap_or_else(|| config.cache.namespace.clone()),
        force_clone: args.force_clone,
        sync_jobs: args.jobs,
        download_jobs,
        repo_url: config.repo.repo_url.clone(),
        repo_revision: config.repo.repo_revision.clone(),
    }
}
