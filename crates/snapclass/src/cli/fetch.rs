//! The `snapclass fetch` command: download from Unsplash/Pexels and classify.

use std::io::Write;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use snapclass_core::fetch::FetchObserver;
use snapclass_core::{
    ClassificationResult, ClassifiedImage, Config, FetchedImage, OutputWriter, Provider,
    Snapclass, StopReason,
};

use super::render::{self, Recorder};
use super::types::{resolve_model, FormatArg, ModelArg, SiteArg};

/// Arguments for the `fetch` command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Site to fetch from
    #[arg(short, long, value_enum, default_value = "unsplash")]
    pub site: SiteArg,

    /// Number of images to fetch
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Model to classify with (defaults to classifier.default_model)
    #[arg(short, long, value_enum, ignore_case = true)]
    pub model: Option<ModelArg>,

    /// Do not append results to the spreadsheet
    #[arg(long)]
    pub no_save: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: FormatArg,
}

impl Default for FetchArgs {
    fn default() -> Self {
        Self {
            site: SiteArg::Unsplash,
            count: 1,
            model: None,
            no_save: false,
            format: FormatArg::Table,
        }
    }
}

/// Streams each classified image to stdout and the spreadsheet while the
/// progress bar tracks the loop.
struct CliObserver<W: Write + Send> {
    writer: OutputWriter<W>,
    recorder: Recorder,
    progress: ProgressBar,
    write_error: Option<std::io::Error>,
}

impl<W: Write + Send> FetchObserver for CliObserver<W> {
    fn on_classified(&mut self, image: &FetchedImage, result: &ClassificationResult) {
        let classified = ClassifiedImage {
            file_path: image.path.clone(),
            file_name: image.file_name.clone(),
            source: image.provider.to_string(),
            result: result.clone(),
        };
        self.progress.suspend(|| {
            if let Err(e) = self.writer.write(&classified) {
                self.write_error.get_or_insert(e);
            }
        });
        self.recorder.record(result, &image.file_name);
        self.progress.set_message(image.file_name.clone());
    }

    fn on_progress(&mut self, done: usize, _total: usize) {
        self.progress.set_position(done as u64);
    }

    fn on_skipped(&mut self, provider: Provider, reason: &str) {
        self.progress
            .suspend(|| render::print_warning(&format!("{provider}: {reason}")));
    }
}

/// Execute the fetch command.
pub async fn execute(args: FetchArgs, config: &Config) -> anyhow::Result<()> {
    if args.count == 0 {
        anyhow::bail!("--count must be at least 1");
    }
    let count = if args.count > config.fetch.max_count {
        render::print_warning(&format!(
            "Count capped at fetch.max_count ({})",
            config.fetch.max_count
        ));
        config.fetch.max_count
    } else {
        args.count
    };

    let model = resolve_model(args.model, config)?;
    let snapclass = Snapclass::new(config.clone())?;
    let fetcher = snapclass.fetcher()?;

    let mut observer = CliObserver {
        writer: OutputWriter::new(std::io::stdout(), args.format.into()),
        recorder: Recorder::new((!args.no_save).then(|| snapclass.results_sheet())),
        progress: create_progress_bar(count as u64),
        write_error: None,
    };

    tracing::info!("Fetching {count} image(s) from {:?} with {model}", args.site);
    let start = std::time::Instant::now();
    let outcome = fetcher
        .fetch(args.site.into(), count, model, &mut observer)
        .await;
    observer.progress.finish_and_clear();
    observer.writer.finish()?;
    if let Some(e) = observer.write_error.take() {
        return Err(e.into());
    }

    let stop = match &outcome.stop {
        StopReason::Completed => "completed".to_string(),
        StopReason::QuotaExhausted => "API usage limit reached".to_string(),
        StopReason::MissingKey => "access key missing".to_string(),
        StopReason::Aborted(_) => "aborted on error".to_string(),
    };
    render::print_summary(
        "Fetch summary",
        &[
            ("Fetched", outcome.paths.len().to_string()),
            ("Requested", count.to_string()),
            ("Stopped", stop),
            ("Elapsed", format!("{:.1}s", start.elapsed().as_secs_f64())),
        ],
    );
    if let Some(line) = observer.recorder.summary() {
        render::print_success(&line);
    }

    match outcome.stop {
        StopReason::QuotaExhausted => render::print_warning(
            "Reset the counter with `snapclass usage reset` once your provider quota allows.",
        ),
        StopReason::MissingKey => render::print_warning(&format!(
            "Add unsplash_access_key / pexels_access_key to {}",
            config.keys_path().display()
        )),
        StopReason::Aborted(message) => anyhow::bail!(message),
        StopReason::Completed => {}
    }
    Ok(())
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapclass_core::{ModelKind, Prediction};

    #[test]
    fn observer_writes_fetched_images_as_jsonl() {
        let mut observer = CliObserver {
            writer: OutputWriter::new(Vec::new(), snapclass_core::OutputFormat::JsonLines),
            recorder: Recorder::new(None),
            progress: ProgressBar::hidden(),
            write_error: None,
        };
        let image = FetchedImage {
            provider: Provider::Pexels,
            file_name: "pexels_1700000000.jpg".to_string(),
            path: "pexels_images/pexels_1700000000.jpg".into(),
            bytes: Vec::new(),
        };
        let result = ClassificationResult {
            model: ModelKind::ResNet50,
            predictions: vec![Prediction::new("n09428293", "seashore", 71.3)],
        };

        observer.on_classified(&image, &result);
        observer.on_progress(1, 1);

        let output = String::from_utf8(observer.writer.into_inner()).unwrap();
        assert!(output.contains("\"source\":\"Pexels\""));
        assert!(output.contains("\"class_name\":\"seashore\""));
        assert_eq!(observer.progress.position(), 1);
    }
}
