//! Persisted per-provider API usage counter.
//!
//! Counts are stored as a JSON object keyed by provider name, e.g.
//! `{"Unsplash": 12, "Pexels": 3}`. A call is permitted only while the count
//! for its provider is below the limit; permitted calls are counted before
//! they are made.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::QuotaError;
use crate::types::Provider;

/// File-backed usage counter with a fixed ceiling per provider.
#[derive(Debug, Clone)]
pub struct UsageCounter {
    path: PathBuf,
    limit: u32,
}

impl UsageCounter {
    pub fn new(path: impl Into<PathBuf>, limit: u32) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Check the quota for `provider` and, if under the limit, record one call.
    ///
    /// Returns `false` without touching the file when the limit is reached.
    pub fn check_and_consume(&self, provider: Provider) -> Result<bool, QuotaError> {
        if !self.path.exists() {
            self.save(&BTreeMap::new())?;
        }

        let mut usage = self.load()?;
        let key = provider.display_name();
        let used = usage.get(key).copied().unwrap_or(0);

        if used >= u64::from(self.limit) {
            tracing::warn!(
                "API usage limit reached for {provider} ({used}/{}). Please wait or reset the API usage.",
                self.limit
            );
            return Ok(false);
        }

        usage.insert(key.to_string(), used + 1);
        self.save(&usage)?;
        tracing::debug!("{provider} usage: {}/{}", used + 1, self.limit);
        Ok(true)
    }

    /// Clear all counts.
    pub fn reset(&self) -> Result<(), QuotaError> {
        self.save(&BTreeMap::new())?;
        tracing::info!("API usage count has been reset");
        Ok(())
    }

    /// Current count for a provider (zero if never used).
    pub fn count(&self, provider: Provider) -> Result<u64, QuotaError> {
        Ok(self
            .load_or_empty()?
            .get(provider.display_name())
            .copied()
            .unwrap_or(0))
    }

    /// Calls left before the limit is hit.
    pub fn remaining(&self, provider: Provider) -> Result<u64, QuotaError> {
        Ok(u64::from(self.limit).saturating_sub(self.count(provider)?))
    }

    /// Counts for every known provider, in display order.
    pub fn snapshot(&self) -> Result<Vec<(Provider, u64)>, QuotaError> {
        let usage = self.load_or_empty()?;
        Ok(Provider::ALL
            .iter()
            .map(|p| (*p, usage.get(p.display_name()).copied().unwrap_or(0)))
            .collect())
    }

    fn load_or_empty(&self) -> Result<BTreeMap<String, u64>, QuotaError> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(BTreeMap::new())
        }
    }

    fn load(&self) -> Result<BTreeMap<String, u64>, QuotaError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| QuotaError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_usage(&content).map_err(|message| QuotaError::Corrupt {
            path: self.path.clone(),
            message,
        })
    }

    fn save(&self, usage: &BTreeMap<String, u64>) -> Result<(), QuotaError> {
        let io_err = |source| QuotaError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Atomic write: temp file, then rename over the original.
        let content = serde_json::to_string(usage).map_err(|e| QuotaError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, content).map_err(io_err)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

/// Parse the usage file body. Empty files and a bare `0` both mean
/// "no usage recorded".
fn parse_usage(content: &str) -> Result<BTreeMap<String, u64>, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(trimmed).map_err(|e| e.to_string())
}
