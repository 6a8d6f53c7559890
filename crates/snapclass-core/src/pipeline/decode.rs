//! Image decoding with content-based format detection.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::ClassifyError;

/// Decode an image held in memory. `path` is only used for error context and
/// as a format hint when the content is ambiguous.
pub fn decode_bytes(bytes: &[u8], path: &Path) -> Result<DynamicImage, ClassifyError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ClassifyError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {e}"),
        })?;

    let reader = if reader.format().is_some() {
        reader
    } else {
        let format = ImageFormat::from_path(path).map_err(|_| ClassifyError::Decode {
            path: path.to_path_buf(),
            message: "Unsupported image format".to_string(),
        })?;
        let mut reader = image::ImageReader::new(Cursor::new(bytes));
        reader.set_format(format);
        reader
    };

    reader.decode().map_err(|e| ClassifyError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read and decode an image file.
pub fn decode_file(path: &Path) -> Result<DynamicImage, ClassifyError> {
    let bytes = std::fs::read(path).map_err(|e| ClassifyError::Decode {
        path: path.to_path_buf(),
        message: format!("Cannot read file: {e}"),
    })?;
    decode_bytes(&bytes, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name still decode.
        let bytes = png_bytes(8, 6);
        let image = decode_bytes(&bytes, Path::new("pexels_1.jpg")).unwrap();
        assert_eq!(image.dimensions(), (8, 6));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = decode_bytes(b"definitely not an image", Path::new("x.bin")).unwrap_err();
        assert!(matches!(err, ClassifyError::Decode { .. }));
    }

    #[test]
    fn test_decode_file_missing() {
        let err = decode_file(Path::new("/nonexistent/cat.jpg")).unwrap_err();
        assert!(err.to_string().contains("Cannot read file"));
    }
}
