//! CLI enum types shared by the classify and fetch commands.

use clap::ValueEnum;
use snapclass_core::{ModelKind, OutputFormat as CoreOutputFormat, Provider, SiteSelection};

/// Pretrained network to classify with.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ModelArg {
    /// ResNet50 (224×224 input)
    #[value(name = "resnet50")]
    Resnet50,
    /// VGG16 (224×224 input)
    #[value(name = "vgg16")]
    Vgg16,
    /// InceptionV3 (299×299 input)
    #[value(name = "inception-v3", alias = "inceptionv3")]
    InceptionV3,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Resnet50 => ModelKind::ResNet50,
            ModelArg::Vgg16 => ModelKind::Vgg16,
            ModelArg::InceptionV3 => ModelKind::InceptionV3,
        }
    }
}

impl From<ModelKind> for ModelArg {
    fn from(kind: ModelKind) -> Self {
        match kind {
            ModelKind::ResNet50 => ModelArg::Resnet50,
            ModelKind::Vgg16 => ModelArg::Vgg16,
            ModelKind::InceptionV3 => ModelArg::InceptionV3,
        }
    }
}

/// Image site(s) to fetch from.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum SiteArg {
    #[default]
    Unsplash,
    Pexels,
    /// Pick Unsplash or Pexels at random for every image
    Both,
}

impl From<SiteArg> for SiteSelection {
    fn from(arg: SiteArg) -> Self {
        match arg {
            SiteArg::Unsplash => SiteSelection::Single(Provider::Unsplash),
            SiteArg::Pexels => SiteSelection::Single(Provider::Pexels),
            SiteArg::Both => SiteSelection::Both,
        }
    }
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Top-5 table per image
    #[default]
    Table,
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<FormatArg> for CoreOutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => CoreOutputFormat::Table,
            FormatArg::Json => CoreOutputFormat::Json,
            FormatArg::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for FormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatArg::Table => write!(f, "table"),
            FormatArg::Json => write!(f, "json"),
            FormatArg::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Resolve the model flag, falling back to the configured default.
pub fn resolve_model(
    arg: Option<ModelArg>,
    config: &snapclass_core::Config,
) -> anyhow::Result<ModelKind> {
    match arg {
        Some(arg) => Ok(arg.into()),
        None => Ok(config.classifier.default_model.parse()?),
    }
}

/// Whether `model` is the configured default. Accepts any spelling the
/// config validation accepts (`resnet50`, `inception_v3`, ...).
pub fn is_default_model(model: ModelKind, config: &snapclass_core::Config) -> bool {
    config.classifier.default_model.parse::<ModelKind>().ok() == Some(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_arg_round_trips_through_kind() {
        for kind in ModelKind::ALL {
            assert_eq!(ModelKind::from(ModelArg::from(kind)), kind);
        }
    }

    #[test]
    fn site_both_selects_alternating() {
        assert_eq!(SiteSelection::from(SiteArg::Both), SiteSelection::Both);
        assert_eq!(
            SiteSelection::from(SiteArg::Pexels),
            SiteSelection::Single(Provider::Pexels)
        );
    }

    #[test]
    fn missing_model_flag_uses_config_default() {
        let mut config = snapclass_core::Config::default();
        config.classifier.default_model = "InceptionV3".to_string();
        assert_eq!(resolve_model(None, &config).unwrap(), ModelKind::InceptionV3);
        assert_eq!(
            resolve_model(Some(ModelArg::Vgg16), &config).unwrap(),
            ModelKind::Vgg16
        );
    }

    #[test]
    fn default_model_matches_lowercase_config_value() {
        let mut config = snapclass_core::Config::default();
        config.classifier.default_model = "resnet50".to_string();
        assert!(is_default_model(ModelKind::ResNet50, &config));
        assert!(!is_default_model(ModelKind::Vgg16, &config));

        config.classifier.default_model = "inception_v3".to_string();
        assert!(is_default_model(ModelKind::InceptionV3, &config));
    }
}
