//! Provider access keys.
//!
//! Keys live in a small JSON file (`config.json` by default):
//!
//! ```json
//! { "unsplash_access_key": "...", "pexels_access_key": "${PEXELS_KEY}" }
//! ```
//!
//! A missing file or missing key is not an error: the loader logs and returns
//! `None`, and the fetcher skips the run.

use serde::Deserialize;
use std::path::Path;

use crate::types::Provider;

#[derive(Debug, Default, Deserialize)]
struct AccessKeys {
    #[serde(default)]
    unsplash_access_key: Option<String>,
    #[serde(default)]
    pexels_access_key: Option<String>,
}

/// Load the access key for `provider` from the key file at `path`.
pub fn load_access_key(path: &Path, provider: Provider) -> Option<String> {
    if !path.exists() {
        tracing::warn!("Configuration file not found: {}", path.display());
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Cannot read {}: {e}", path.display());
            return None;
        }
    };

    let keys: AccessKeys = match serde_json::from_str(&content) {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!("Cannot parse {}: {e}", path.display());
            return None;
        }
    };

    let raw = match provider {
        Provider::Unsplash => keys.unsplash_access_key,
        Provider::Pexels => keys.pexels_access_key,
    };

    let key = raw.as_deref().and_then(resolve_env_var);
    if key.is_none() {
        tracing::warn!("No {provider} access key in {}", path.display());
    }
    key
}

/// Resolve `${ENV_VAR}` references in key values.
pub fn resolve_env_var(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
