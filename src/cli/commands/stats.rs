//! Stats command - read back the timing record of a workspace checkout

use crate::cli::args::{OutputFormat, StatsArgs};
use crate::config::Config;
use crate::error::RepoCacheResult;
use crate::orchestration::CheckoutStats;
use console::style;

/// Execute the stats command
pub async fn execute(args: StatsArgs, _config: &Config) -> RepoCacheResult<()> {
    let stats = CheckoutStats::load(&CheckoutStats::path(&args.directory)).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Table => print_table(&stats),
    }

    Ok(())
}

fn print_table(stats: &CheckoutStats) {
    println!(
        "{:<40} {:>12}",
        style("PROJECT").bold(),
        style("DURATION").bold()
    );
    println!("{}", "-".repeat(53));

    for (name, project) in &stats.projects {
        println!("{:<40} {:>12}", name, format_millis(project.duration));
    }

    println!();
    println!(
        "{} project(s), started {}",
        stats.projects.len(),
        stats.start.format("%Y-%m-%d %H:%M:%S")
    );
    match stats.duration {
        Some(total) => println!("total {}", format_millis(total)),
        None => println!("{}", style("run did not finish").yellow()),
    }
}

fn format_millis(millis: u64) -> String {
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", millis as f64 / 1000.0)
    }
}
