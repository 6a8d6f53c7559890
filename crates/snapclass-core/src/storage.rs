//! Local image storage: download and upload directories, generated
//! filenames, and the reset operations behind `snapclass reset`.

use std::io;
use std::path::{Path, PathBuf};

/// Create a directory (and parents) if it does not exist.
pub fn create_directory(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        tracing::debug!("Created directory {:?}", dir);
    }
    Ok(())
}

/// Delete a directory and everything in it. Missing directories are fine.
pub fn delete_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
        tracing::debug!("Deleted directory {:?}", dir);
    }
    Ok(())
}

/// Delete and recreate a directory.
pub fn reset_directory(dir: &Path) -> io::Result<()> {
    delete_directory(dir)?;
    create_directory(dir)
}

/// Delete the files directly inside `dir`, keeping the directory and any
/// subdirectories. Returns the number of files removed.
pub fn clear_directory(dir: &Path) -> io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    tracing::info!("Removed {removed} file(s) from {:?}", dir);
    Ok(removed)
}

/// Write fetched image bytes to `path`, creating its parent directory.
pub fn save_fetched_image(bytes: &[u8], path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        create_directory(parent)?;
    }
    std::fs::write(path, bytes)
}

/// Copy a local image into the uploads directory under a timestamped name.
///
/// The original extension is kept; the stem becomes `upload_{timestamp}`.
pub fn save_uploaded_image(source: &Path, uploads_dir: &Path) -> io::Result<PathBuf> {
    create_directory(uploads_dir)?;
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "png".to_string());
    let dest = unique_path(uploads_dir, "upload", &extension, timestamp());
    std::fs::copy(source, &dest)?;
    tracing::debug!("Saved upload {:?} as {:?}", source, dest);
    Ok(dest)
}

/// Generate a fresh `.jpg` path for a downloaded image.
pub fn unique_image_path(dir: &Path, prefix: &str) -> PathBuf {
    unique_path(dir, prefix, "jpg", timestamp())
}

/// `{prefix}_{stamp}.{ext}`, or `{prefix}_{stamp}_{n}.{ext}` when that name
/// is already taken (several downloads within the same second).
fn unique_path(dir: &Path, prefix: &str, extension: &str, stamp: i64) -> PathBuf {
    let candidate = dir.join(format!("{prefix}_{stamp}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{prefix}_{stamp}_{n}.{extension}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

fn timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_path_adds_suffix_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_path(dir.path(), "unsplash", "jpg", 1_700_000_000);
        assert_eq!(first.file_name().unwrap(), "unsplash_1700000000.jpg");

        std::fs::write(&first, b"x").unwrap();
        let second = unique_path(dir.path(), "unsplash", "jpg", 1_700_000_000);
        assert_eq!(second.file_name().unwrap(), "unsplash_1700000000_1.jpg");
    }

    #[test]
    fn test_save_fetched_image_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pexels_images").join("pexels_1.jpg");
        save_fetched_image(b"bytes", &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }

    #[test]
    fn test_save_uploaded_image_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cat.PNG");
        std::fs::write(&source, b"png").unwrap();

        let dest = save_uploaded_image(&source, &dir.path().join("local_images")).unwrap();
        assert_eq!(dest.extension().unwrap(), "png");
        assert!(dest
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("upload_"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"png");
    }

    #[test]
    fn test_clear_directory_keeps_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        assert_eq!(clear_directory(dir.path()).unwrap(), 2);
        assert!(dir.path().join("nested").exists());
        assert_eq!(clear_directory(&dir.path().join("missing")).unwrap(), 0);
    }

    #[test]
    fn test_reset_directory_empties_it() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("unsplash_images");
        save_fetched_image(b"x", &target.join("one.jpg")).unwrap();

        reset_directory(&target).unwrap();
        assert!(target.exists());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }
}
