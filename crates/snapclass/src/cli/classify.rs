//! The `snapclass classify` command for local images.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use snapclass_core::pipeline::FileDiscovery;
use snapclass_core::{Config, OutputWriter, Snapclass};

use super::render::{self, Recorder};
use super::types::{resolve_model, FormatArg, ModelArg};

/// Arguments for the `classify` command.
#[derive(Args, Debug, Default)]
pub struct ClassifyArgs {
    /// Image files or directories to classify
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Model to classify with (defaults to classifier.default_model)
    #[arg(short, long, value_enum, ignore_case = true)]
    pub model: Option<ModelArg>,

    /// Do not append results to the spreadsheet
    #[arg(long)]
    pub no_save: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: FormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    let files = FileDiscovery::discover_all(&args.paths);
    if files.is_empty() {
        anyhow::bail!("No supported images found (jpg, jpeg, png, gif, bmp, webp)");
    }

    let model = resolve_model(args.model, config)?;
    let snapclass = Snapclass::new(config.clone())?;
    tracing::info!("Classifying {} image(s) with {model}", files.len());

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into());
    let mut recorder = Recorder::new((!args.no_save).then(|| snapclass.results_sheet()));

    let start = std::time::Instant::now();
    let mut failed = 0usize;

    for file in &files {
        match snapclass.classify_upload(&file.path, model).await {
            Ok(image) => {
                writer.write(&image)?;
                recorder.record(&image.result, &image.file_name);
            }
            Err(e) => {
                tracing::error!("Failed to classify {:?}: {e}", file.path);
                failed += 1;
            }
        }
    }
    writer.finish()?;
    let succeeded = writer.items_written();

    if files.len() > 1 || failed > 0 {
        let mut lines = vec![
            ("Classified", succeeded.to_string()),
            ("Model", model.to_string()),
            ("Elapsed", format!("{:.1}s", start.elapsed().as_secs_f64())),
        ];
        if failed > 0 {
            lines.insert(1, ("Failed", failed.to_string()));
        }
        render::print_summary("Summary", &lines);
    }
    if let Some(line) = recorder.summary() {
        render::print_success(&line);
    }

    if succeeded == 0 {
        anyhow::bail!("No images were classified");
    }
    Ok(())
}
