//! ImageNet class index in the Keras `imagenet_class_index.json` format:
//! `{"0": ["n01440764", "tench"], "1": ["n01443537", "goldfish"], ...}`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ClassifyError;

/// Class index → (WordNet id, label).
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    entries: Vec<(String, String)>,
}

impl LabelIndex {
    /// Load the label index from disk.
    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        if !path.exists() {
            return Err(ClassifyError::ModelMissing {
                path: path.to_path_buf(),
                hint: "Run `snapclass models labels` first.".to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ClassifyError::Labels {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|message| ClassifyError::Labels {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse the Keras JSON format. Keys must be contiguous indices from 0.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let raw: HashMap<String, (String, String)> =
            serde_json::from_str(content).map_err(|e| e.to_string())?;

        let mut indexed = raw
            .into_iter()
            .map(|(k, v)| {
                k.parse::<usize>()
                    .map(|i| (i, v))
                    .map_err(|_| format!("non-numeric class index {k:?}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_by_key(|(i, _)| *i);

        if let Some((pos, (i, _))) = indexed.iter().enumerate().find(|(pos, (i, _))| pos != i) {
            return Err(format!("class index {i} found at position {pos}; indices must be 0..n"));
        }

        Ok(Self {
            entries: indexed.into_iter().map(|(_, v)| v).collect(),
        })
    }

    /// (WordNet id, label) for a class index.
    pub fn get(&self, index: usize) -> Option<(&str, &str)> {
        self.entries
            .get(index)
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
