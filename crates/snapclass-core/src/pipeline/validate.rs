//! Magic-byte validation for downloaded payloads.
//!
//! Providers occasionally answer an image URL with an HTML or JSON error
//! page; those are caught here before anything is written to disk.

/// Check if the leading bytes match a known image format.
pub fn is_image_payload(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }

    // JPEG: FF D8 FF
    if bytes[0] == 0xFF && bytes[1] == 0xD8 && bytes[2] == 0xFF {
        return true;
    }

    // PNG: 89 50 4E 47
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }

    // GIF: GIF8
    if bytes.starts_with(b"GIF8") {
        return true;
    }

    // WebP: RIFF....WEBP
    if bytes.starts_with(b"RIFF") {
        return bytes.len() < 12 || &bytes[8..12] == b"WEBP";
    }

    // BMP: BM
    if bytes.starts_with(b"BM") {
        return true;
    }

    // TIFF: II*\0 or MM\0*
    if bytes.starts_with(&[b'I', b'I', 0x2A, 0x00]) || bytes.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return true;
    }

    // HEIC/AVIF: ftyp box at offset 4
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_jpeg() {
        assert!(is_image_payload(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]));
    }

    #[test]
    fn test_magic_bytes_png() {
        assert!(is_image_payload(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]));
    }

    #[test]
    fn test_magic_bytes_webp() {
        assert!(is_image_payload(b"RIFF\0\0\0\0WEBP"));
        assert!(!is_image_payload(b"RIFF\0\0\0\0WAVE"));
    }

    #[test]
    fn test_html_error_page_rejected() {
        assert!(!is_image_payload(b"<!DOCTYPE html><html>"));
        assert!(!is_image_payload(br#"{"errors":["OAuth error"]}"#));
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(!is_image_payload(&[0xFF, 0xD8]));
    }
}
