//! The `snapclass models` command for managing classifier models.
//!
//! Each network is an ONNX export of the Keras application, installed as
//! `{model_dir}/{slug}/model.onnx`. All three share the ImageNet label index.

use clap::{Args, Subcommand};
use snapclass_core::classify::{LabelIndex, OnnxClassifier};
use snapclass_core::{Config, ModelKind};
use std::path::{Path, PathBuf};

use super::render;
use super::types::{is_default_model, ModelArg};

/// Keras ImageNet class index, shared by all three networks.
pub const LABELS_URL: &str =
    "https://storage.googleapis.com/download.tensorflow.org/data/imagenet_class_index.json";

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List supported models and whether they are installed
    List,

    /// Show model directory path
    Path,

    /// Install an ONNX export for a model
    Install {
        /// Model the file belongs to
        #[arg(value_enum, ignore_case = true)]
        model: ModelArg,

        /// Path to the .onnx file
        file: PathBuf,

        /// Replace an existing model file
        #[arg(long)]
        force: bool,
    },

    /// Download the ImageNet label index
    Labels {
        /// Download again even if present
        #[arg(long)]
        force: bool,
    },
}

/// Status of each model file on disk.
pub struct InstalledModels {
    pub models: Vec<(ModelKind, bool)>,
    pub labels: bool,
}

impl InstalledModels {
    /// True if `model` and the label index are both present.
    pub fn can_classify(&self, model: ModelKind) -> bool {
        self.labels && self.models.iter().any(|(m, ready)| *m == model && *ready)
    }
}

/// Check which models are currently installed.
pub fn check_installed(config: &Config) -> InstalledModels {
    let model_dir = config.model_dir();
    InstalledModels {
        models: ModelKind::ALL
            .iter()
            .map(|&m| (m, OnnxClassifier::model_exists(&model_dir, m)))
            .collect(),
        labels: OnnxClassifier::labels_path(&model_dir).exists(),
    }
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::List => {
            let model_dir = config.model_dir();
            let installed = check_installed(config);

            println!("Models:");
            println!("  Directory: {}\n", model_dir.display());

            for (model, ready) in &installed.models {
                let status = if *ready { "ready" } else { "not installed" };
                let default_marker = if is_default_model(*model, config) {
                    "  (default)"
                } else {
                    ""
                };
                println!(
                    "    - {:14} {:>3}px  {:14}{}",
                    model.name(),
                    model.input_size(),
                    status,
                    default_marker
                );
            }

            let labels_status = if installed.labels { "ready" } else { "not installed" };
            println!("\n  Labels:");
            println!("    - {:30} {}", snapclass_core::classify::LABELS_FILENAME, labels_status);

            if !installed.labels {
                println!("\nRun `snapclass models labels` to download the label index.");
            }
            if installed.models.iter().any(|(_, ready)| !ready) {
                println!("Run `snapclass models install <model> <file.onnx>` to add a model.");
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }

        ModelsCommand::Install { model, file, force } => {
            let dest = install_model(config, model.into(), &file, force)?;
            render::print_success(&format!("Installed {} at {}", ModelKind::from(model), dest.display()));
        }

        ModelsCommand::Labels { force } => {
            let client = reqwest::Client::new();
            let dest = download_labels(config, &client, force).await?;
            render::print_success(&format!("Label index at {}", dest.display()));
        }
    }

    Ok(())
}

/// Copy an ONNX file into place for `model`.
pub fn install_model(
    config: &Config,
    model: ModelKind,
    source: &Path,
    force: bool,
) -> anyhow::Result<PathBuf> {
    if !source.is_file() {
        anyhow::bail!("Model file not found: {}", source.display());
    }
    if source.extension().and_then(|e| e.to_str()) != Some("onnx") {
        anyhow::bail!("Expected an .onnx file, got {}", source.display());
    }

    let dest = OnnxClassifier::model_path(&config.model_dir(), model);
    if dest.exists() && !force {
        anyhow::bail!(
            "{model} is already installed at: {}\nUse --force to replace it.",
            dest.display()
        );
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::copy(source, &dest)?;
    let file_size = std::fs::metadata(&dest)?.len();
    tracing::info!(
        "Installed {model} ({:.1} MB) at {:?}",
        file_size as f64 / (1024.0 * 1024.0),
        dest
    );
    Ok(dest)
}

/// Download the label index unless it is already present.
pub async fn download_labels(
    config: &Config,
    client: &reqwest::Client,
    force: bool,
) -> anyhow::Result<PathBuf> {
    let model_dir = config.model_dir();
    let dest = OnnxClassifier::labels_path(&model_dir);

    if dest.exists() && !force {
        tracing::info!("Label index already exists at {:?}", dest);
        return Ok(dest);
    }

    std::fs::create_dir_all(&model_dir)?;
    tracing::info!("Downloading ImageNet label index...");
    tracing::info!("  Source: {}", LABELS_URL);
    tracing::info!("  Destination: {:?}", dest);
    download_file(client, LABELS_URL, &dest).await?;

    if let Err(e) = verify_labels(&dest) {
        let _ = std::fs::remove_file(&dest);
        return Err(e);
    }
    Ok(dest)
}

/// Download a file from a URL to a local path, streaming to disk.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    if let Some(size) = response.content_length() {
        tracing::info!("  Size: {:.1} KB", size as f64 / 1024.0);
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Check that a downloaded label index parses.
fn verify_labels(path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let labels = LabelIndex::from_json(&content)
        .map_err(|e| anyhow::anyhow!("Invalid label index {}: {e}\nFile removed.", path.display()))?;
    tracing::debug!("  {} classes", labels.len());
    Ok(())
}
