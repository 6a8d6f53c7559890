//! Guided classification of local images.
//!
//! Walks the user through: input path → model → save to spreadsheet, then
//! delegates to `cli::classify::execute()`.

use console::Style;
use dialoguer::{Confirm, Input};
use snapclass_core::pipeline::FileDiscovery;
use snapclass_core::Config;
use std::path::PathBuf;

use super::theme::snapclass_theme;
use crate::cli::classify::{self, ClassifyArgs};
use crate::cli::models::check_installed;

pub async fn guided_classify(config: &Config) -> anyhow::Result<()> {
    let theme = snapclass_theme();
    let warn = Style::new().for_stderr().yellow();

    let (path, count) = loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Path to image or folder")
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(&raw_path).into_owned());
        if !path.exists() {
            eprintln!("  {}", warn.apply_to(format!("Path not found: {}", path.display())));
            continue;
        }

        let found = FileDiscovery::discover(&path);
        if found.is_empty() {
            eprintln!("  {}", warn.apply_to("No supported images found at that path."));
            continue;
        }
        break (path, found.len());
    };

    let dim = Style::new().for_stderr().dim();
    eprintln!("  {}", dim.apply_to(format!("Found {count} image(s)")));

    let Some(model) = super::select_model(config)? else {
        return Ok(());
    };

    if !check_installed(config).can_classify(model.into()) {
        eprintln!(
            "  {}",
            warn.apply_to(format!(
                "{} is not installed. See `snapclass models list`.",
                snapclass_core::ModelKind::from(model)
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

    let args = ClassifyArgs {
        paths: vec![path],
        model: Some(model),
        no_save: !save,
        ..ClassifyArgs::default()
    };
    classify::execute(args, config).await
}
