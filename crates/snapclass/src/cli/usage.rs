//! The `snapclass usage` command for the API usage counter.

use clap::{Args, Subcommand};
use snapclass_core::{Config, UsageCounter};

use super::render;

/// Arguments for the `usage` command.
#[derive(Args, Debug)]
pub struct UsageArgs {
    #[command(subcommand)]
    pub command: UsageCommand,
}

/// Subcommands for the usage counter.
#[derive(Subcommand, Debug)]
pub enum UsageCommand {
    /// Show calls made per provider against the limit
    Show,

    /// Clear all counts
    Reset,
}

/// Execute the usage command.
pub async fn execute(args: UsageArgs, config: &Config) -> anyhow::Result<()> {
    let counter = UsageCounter::new(config.usage_path(), config.quota.limit);

    match args.command {
        UsageCommand::Show => print_usage(&counter)?,
        UsageCommand::Reset => {
            counter.reset()?;
            render::print_success("API usage count has been reset");
        }
    }
    Ok(())
}

/// Print one line per provider: used / limit and what is left.
pub fn print_usage(counter: &UsageCounter) -> anyhow::Result<()> {
    println!("API usage ({}):", counter.path().display());
    for line in usage_lines(counter)? {
        println!("  {line}");
    }
    Ok(())
}

fn usage_lines(counter: &UsageCounter) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for (provider, used) in counter.snapshot()? {
        lines.push(format!(
            "{:<10} {:>5}/{:<5} {} remaining",
            provider.display_name(),
            used,
            counter.limit(),
            counter.remaining(provider)?
        ));
    }
    Ok(lines)
}
