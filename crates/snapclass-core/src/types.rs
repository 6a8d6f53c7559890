//! Core data types shared across the fetch, classify and results stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::classify::ModelKind;

/// An external image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Unsplash,
    Pexels,
}

impl Provider {
    /// All providers, in menu order.
    pub const ALL: [Provider; 2] = [Provider::Unsplash, Provider::Pexels];

    /// Human-readable name. Also the key used in the usage file.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Unsplash => "Unsplash",
            Provider::Pexels => "Pexels",
        }
    }

    /// Prefix for generated image filenames.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Provider::Unsplash => "unsplash",
            Provider::Pexels => "pexels",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unsplash" => Ok(Provider::Unsplash),
            "pexels" => Ok(Provider::Pexels),
            other => Err(format!("Unsupported site '{other}'")),
        }
    }
}

/// Which site(s) a fetch run draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteSelection {
    Single(Provider),
    /// Pick Unsplash or Pexels at random for every image.
    Both,
}

/// A single labeled prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// WordNet synset identifier (e.g., "n02123045")
    pub class_id: String,

    /// Human-readable label (e.g., "tabby")
    pub class_name: String,

    /// Confidence as a percentage, rounded to two decimals
    pub confidence: f64,
}

impl Prediction {
    pub fn new(class_id: impl Into<String>, class_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            class_id: class_id.into(),
            class_name: class_name.into(),
            confidence,
        }
    }
}

/// Top-5 output for one image, sorted by descending confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Network that produced the predictions
    pub model: ModelKind,

    /// Predictions, best first
    pub predictions: Vec<Prediction>,
}

impl ClassificationResult {
    /// The highest-confidence prediction, if any.
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }
}

/// An image downloaded from a provider and written to local storage.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Source provider
    pub provider: Provider,

    /// Generated filename (provider prefix + timestamp)
    pub file_name: String,

    /// Where the bytes were written
    pub path: PathBuf,

    /// Raw payload as downloaded
    pub bytes: Vec<u8>,
}

/// A classified image ready for rendering or serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedImage {
    /// Local path of the classified file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Provider name, or "Upload" for local images
    pub source: String,

    /// Top-5 predictions
    pub result: ClassificationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_is_case_insensitive() {
        assert_eq!("Unsplash".parse::<Provider>().unwrap(), Provider::Unsplash);
        assert_eq!("PEXELS".parse::<Provider>().unwrap(), Provider::Pexels);
        assert!("Flickr".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_display_matches_usage_key() {
        assert_eq!(Provider::Unsplash.to_string(), "Unsplash");
        assert_eq!(Provider::Pexels.file_prefix(), "pexels");
    }

    #[test]
    fn test_classified_image_serializes_predictions() {
        let image = ClassifiedImage {
            file_path: PathBuf::from("unsplash_images/unsplash_1700000000.jpg"),
            file_name: "unsplash_1700000000.jpg".to_string(),
            source: "Unsplash".to_string(),
            result: ClassificationResult {
                model: ModelKind::ResNet50,
                predictions: vec![Prediction::new("n02123045", "tabby", 81.25)],
            },
        };
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"class_name\":\"tabby\""));
        assert!(json.contains("\"model\":\"ResNet50\""));
    }
}
