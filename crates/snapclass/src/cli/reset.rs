//! The `snapclass reset` command for local storage directories.

use clap::{Args, Subcommand};
use snapclass_core::{storage, Config, Provider};

use super::render;

/// Arguments for the `reset` command.
#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(subcommand)]
    pub target: ResetTarget,
}

/// What to clear.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    /// Delete copies of classified local images
    Uploads,

    /// Delete images downloaded from Unsplash and Pexels
    Fetched,

    /// Delete the output directory, including the results spreadsheet
    Output,
}

/// Execute the reset command.
pub async fn execute(args: ResetArgs, config: &Config) -> anyhow::Result<()> {
    let cleared = reset(args.target, config)?;
    for dir in cleared {
        render::print_success(&format!("Reset {}", dir.display()));
    }
    Ok(())
}

/// Recreate the directories behind `target` empty. Returns them.
pub fn reset(target: ResetTarget, config: &Config) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let dirs = match target {
        ResetTarget::Uploads => vec![config.uploads_dir()],
        ResetTarget::Fetched => Provider::ALL
            .iter()
            .map(|p| config.provider_dir(*p))
            .collect(),
        ResetTarget::Output => vec![config.output_dir()],
    };
    for dir in &dirs {
        storage::reset_directory(dir)?;
        tracing::info!("Reset {:?}", dir);
    }
    Ok(dirs)
}
