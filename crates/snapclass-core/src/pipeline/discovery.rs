//! File discovery for finding local images to classify.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions accepted for local classification.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
}

/// Discovers image files in directories.
#[derive(Debug, Default)]
pub struct FileDiscovery;

impl FileDiscovery {
    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files.
    pub fn discover(path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if Self::is_supported(path) {
                return vec![DiscoveredFile {
                    path: path.to_path_buf(),
                }];
            }
            return vec![];
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && Self::is_supported(e.path()))
            .map(|e| DiscoveredFile {
                path: e.into_path(),
            })
            .collect();

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Discover across several inputs, keeping the argument order.
    pub fn discover_all(paths: &[PathBuf]) -> Vec<DiscoveredFile> {
        paths.iter().flat_map(|p| Self::discover(p)).collect()
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
            })
            .unwrap_or(false)
    }
}
