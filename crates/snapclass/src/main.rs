//! Snapclass CLI - fetch images from Unsplash or Pexels, classify them with
//! pretrained ImageNet networks and record the top-5 labels in a spreadsheet.
//!
//! # Usage
//!
//! ```bash
//! # Classify local images
//! snapclass classify photo.jpg ./holiday/ --model inception-v3
//!
//! # Fetch and classify five images from Pexels
//! snapclass fetch --site pexels --count 5
//!
//! # Check or reset the API usage counter
//! snapclass usage show
//!
//! # Menu-driven mode
//! snapclass
//! ```

use std::io::IsTerminal;

use clap::{CommandFactory, Parser, Subcommand};

mod cli;
mod logging;

/// Snapclass - fetch, classify and record images.
#[derive(Parser, Debug)]
#[command(name = "snapclass")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Without a subcommand, an interactive menu opens on a terminal
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify local images
    Classify(cli::classify::ClassifyArgs),

    /// Fetch images from Unsplash or Pexels and classify them
    Fetch(cli::fetch::FetchArgs),

    /// Show or reset the API usage counter
    Usage(cli::usage::UsageArgs),

    /// Manage classifier models (list, install, labels)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    /// Clear stored images or results
    Reset(cli::reset::ResetArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match snapclass_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `snapclass config path`."
            );
            let mut config = snapclass_core::Config::default();
            let limit = std::env::var(snapclass_core::config::USAGE_LIMIT_ENV).ok();
            if let Err(e) = config.apply_usage_limit_override(limit.as_deref()) {
                eprintln!("Warning: {e}");
            }
            config
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Snapclass v{}", snapclass_core::VERSION);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    match cli.command {
        Some(Commands::Classify(args)) => cli::classify::execute(args, &config).await,
        Some(Commands::Fetch(args)) => cli::fetch::execute(args, &config).await,
        Some(Commands::Usage(args)) => cli::usage::execute(args, &config).await,
        Some(Commands::Models(args)) => cli::models::execute(args, &config).await,
        Some(Commands::Config(args)) => cli::config::execute(args, &config).await,
        Some(Commands::Reset(args)) => cli::reset::execute(args, &config).await,
        None if std::io::stdin().is_terminal() => cli::interactive::run(&config).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fetch_flags() {
        let cli = Cli::parse_from([
            "snapclass", "fetch", "--site", "both", "-n", "3", "--model", "vgg16", "--no-save",
        ]);
        match cli.command {
            Some(Commands::Fetch(args)) => {
                assert_eq!(args.site, cli::types::SiteArg::Both);
                assert_eq!(args.count, 3);
                assert_eq!(args.model, Some(cli::types::ModelArg::Vgg16));
                assert!(args.no_save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_has_no_command() {
        let cli = Cli::parse_from(["snapclass", "--verbose"]);
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }
}
