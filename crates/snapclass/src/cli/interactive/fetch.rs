//! Guided fetch flow: site → count → model → save, then
//! `cli::fetch::execute()`.

use console::Style;
use dialoguer::{Confirm, Input, Select};
use snapclass_core::{Config, ModelKind, UsageCounter};

use super::theme::snapclass_theme;
use crate::cli::fetch::{self, FetchArgs};
use crate::cli::models::check_installed;
use crate::cli::types::SiteArg;

const SITES: &[(&str, SiteArg)] = &[
    ("Unsplash", SiteArg::Unsplash),
    ("Pexels", SiteArg::Pexels),
    ("Both (random per image)", SiteArg::Both),
];

pub async fn guided_fetch(config: &Config) -> anyhow::Result<()> {
    let theme = snapclass_theme();
    let warn = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();

    let counter = UsageCounter::new(config.usage_path(), config.quota.limit);
    for (provider, used) in counter.snapshot()? {
        eprintln!(
            "  {}",
            dim.apply_to(format!("{provider}: {used}/{} calls used", counter.limit()))
        );
    }

    let labels: Vec<&str> = SITES.iter().map(|(label, _)| *label).collect();
    let Some(site) = Select::with_theme(&theme)
        .with_prompt("Fetch from")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };
    let site = SITES[site].1;

    let max = config.fetch.max_count;
    let Some(count) = super::handle_interrupt(
        Input::<usize>::with_theme(&theme)
            .with_prompt(format!("How many images? (1-{max})"))
            .default(1)
            .validate_with(|n: &usize| -> Result<(), String> {
                if (1..=max).contains(n) {
                    Ok(())
                } else {
                    Err(format!("Enter a number between 1 and {max}"))
                }
            })
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let Some(model) = super::select_model(config)? else {
        return Ok(());
    };
    if !check_installed(config).can_classify(model.into()) {
        eprintln!(
            "  {}",
            warn.apply_to(format!(
                "{} is not installed. See `snapclass models list`.",
                ModelKind::from(model)
            ))
        );
        return Ok(());
    }

    let Some(save) = super::handle_interrupt(
        Confirm::with_theme(&theme)
            .with_prompt("Append results to the spreadsheet?")
            .default(true)
            .interact(),
    )?
    else {
        return Ok(());
    };

    let args = FetchArgs {
        site,
        count,
        model: Some(model),
        no_save: !save,
        ..FetchArgs::default()
    };
    fetch::execute(args, config).await
}
