//! Interactive mode: menu-driven flows for bare `snapclass` invocation.
//!
//! Each flow collects choices with dialoguer, builds the same argument struct
//! the flag-based command takes, and delegates to that command.

pub mod classify;
pub mod fetch;
pub mod theme;

use console::Style;
use dialoguer::{Confirm, Select};
use snapclass_core::{Config, UsageCounter};

use super::render;
use super::reset::{self, ResetTarget};
use super::types::{is_default_model, ModelArg};
use super::usage::print_usage;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

const MENU_ITEMS: &[&str] = &[
    "Classify local images",
    "Fetch images from Unsplash / Pexels",
    "API usage",
    "Reset stored images",
    "Show configuration",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();
    let theme = theme::snapclass_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        let outcome = match selection {
            Some(0) => classify::guided_classify(config).await,
            Some(1) => fetch::guided_fetch(config).await,
            Some(2) => usage_menu(config),
            Some(3) => reset_menu(config),
            Some(4) => show_config(config),
            _ => break,
        };

        // A failed flow returns to the menu.
        if let Err(e) = outcome {
            let err = Style::new().for_stderr().red();
            eprintln!("  {} {e:#}", err.apply_to("✗"));
            eprintln!();
        }
    }

    Ok(())
}

/// Model picker shared by the classify and fetch flows.
fn select_model(config: &Config) -> anyhow::Result<Option<ModelArg>> {
    let theme = theme::snapclass_theme();
    let models = snapclass_core::ModelKind::ALL;
    let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
    let default = models
        .iter()
        .position(|m| is_default_model(*m, config))
        .unwrap_or(0);

    let selection = Select::with_theme(&theme)
        .with_prompt("Model")
        .items(&names)
        .default(default)
        .interact_opt()?;
    Ok(selection.map(|i| ModelArg::from(models[i])))
}

fn usage_menu(config: &Config) -> anyhow::Result<()> {
    let theme = theme::snapclass_theme();
    let counter = UsageCounter::new(config.usage_path(), config.quota.limit);

    eprintln!();
    print_usage(&counter)?;
    eprintln!();

    let Some(reset) = handle_interrupt(
        Confirm::with_theme(&theme)
            .with_prompt("Reset API usage count?")
            .default(false)
            .interact(),
    )?
    else {
        return Ok(());
    };
    if reset {
        counter.reset()?;
        render::print_success("API usage count has been reset");
    }
    Ok(())
}

fn reset_menu(config: &Config) -> anyhow::Result<()> {
    let theme = theme::snapclass_theme();
    let items = &["Local uploads", "Fetched images", "Output (results spreadsheet)", "Back"];
    let targets = [ResetTarget::Uploads, ResetTarget::Fetched, ResetTarget::Output];

    let selection = Select::with_theme(&theme)
        .with_prompt("What should be cleared?")
        .items(items)
        .default(0)
        .interact_opt()?;
    let Some(target) = selection.and_then(|i| targets.get(i).copied()) else {
        return Ok(());
    };

    let confirmed = handle_interrupt(
        Confirm::with_theme(&theme)
            .with_prompt("This deletes files permanently. Continue?")
            .default(false)
            .interact(),
    )?
    .unwrap_or(false);
    if confirmed {
        for dir in reset::reset(target, config)? {
            render::print_success(&format!("Reset {}", dir.display()));
        }
    }
    Ok(())
}

/// Summary of current settings, with the full TOML on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::snapclass_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<20} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!("    {:<20} {}", label.apply_to("Model dir:"), config.model_dir().display());
    eprintln!("    {:<20} {}", label.apply_to("Default model:"), config.classifier.default_model);
    eprintln!("    {:<20} {}", label.apply_to("Usage limit:"), config.quota.limit);
    eprintln!("    {:<20} {}", label.apply_to("Access keys:"), config.keys_path().display());
    eprintln!("    {:<20} {}", label.apply_to("Results:"), config.results_path().display());
    eprintln!("    {:<20} {}", label.apply_to("Log level:"), config.logging.level);
    eprintln!();

    let show_toml = handle_interrupt(
        Confirm::with_theme(&theme)
            .with_prompt("View full config (TOML)?")
            .default(false)
            .interact(),
    )?
    .unwrap_or(false);
    if show_toml {
        eprintln!();
        eprintln!("{}", dim.apply_to("─".repeat(50)));
        eprintln!("{}", config.to_toml()?);
        eprintln!("{}", dim.apply_to("─".repeat(50)));
        eprintln!();
    }
    Ok(())
}
