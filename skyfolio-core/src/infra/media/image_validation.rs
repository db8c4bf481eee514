//! Magic byte sniffing for uploaded bytes.
//!
//! The declared `Content-Type` of an upload is only a hint; these checks
//! decide what the bytes actually are before anything is written to disk.

use tracing::warn;

/// Why a buffer was not recognised as an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Too short to contain any supported header
    TooSmall,
    UnrecognizedFormat,
}

/// Detect the image content type from leading bytes.
pub fn validate_magic_bytes(data: &[u8]) -> Result<&'static str, InvalidReason> {
    if data.len() < 4 {
        return Err(InvalidReason::TooSmall);
    }

    // JPEG: FF D8 FF
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok("image/jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.len() >= 8
        && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
    {
        return Ok("image/png");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Ok("image/webp");
    }

    if data.len() >= 6 && &data[0..3] == b"GIF" {
        return Ok("image/gif");
    }

    // TIFF, little and big endian
    if data[0..4] == [0x49, 0x49, 0x2A, 0x00] || data[0..4] == [0x4D, 0x4D, 0x00, 0x2A]
    {
        return Ok("image/tiff");
    }

    if &data[0..2] == b"BM" {
        return Ok("image/bmp");
    }

    warn!(
        "Unrecognized image format, first 8 bytes: {:02X?}",
        &data[..8.min(data.len())]
    );
    Err(InvalidReason::UnrecognizedFormat)
}

/// Detect common video containers. Only used to classify uploads, videos are
/// stored as-is without renditions.
pub fn sniff_video(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 {
        return None;
    }
    // ISO BMFF: ....ftyp<brand>
    if &data[4..8] == b"ftyp" {
        return match &data[8..12] {
            b"qt  " => Some("video/quicktime"),
            b"avif" | b"avis" | b"heic" | b"heix" | b"mif1" => None,
            _ => Some("video/mp4"),
        };
    }
    // Matroska / WebM EBML header
    if data[0..4] == [0x1A, 0x45, 0xDF, 0xA3] {
        return Some("video/webm");
    }
    None
}

/// File extension for a sniffed content type
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/tiff" => "tiff",
        "image/bmp" => "bmp",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_jpeg_magic() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(validate_magic_bytes(&jpeg_header), Ok("image/jpeg"));
    }

    #[test]
    fn test_validate_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(validate_magic_bytes(&png_header), Ok("image/png"));
    }

    #[test]
    fn test_validate_webp_magic() {
        let mut webp = [0u8; 12];
        webp[0..4].copy_from_slice(b"RIFF");
        webp[8..12].copy_from_slice(b"WEBP");
        assert_eq!(validate_magic_bytes(&webp), Ok("image/webp"));
    }

    #[test]
    fn test_validate_too_small() {
        assert_eq!(
            validate_magic_bytes(&[0xFF, 0xD8]),
            Err(InvalidReason::TooSmall)
        );
    }

    #[test]
    fn test_validate_unrecognized() {
        let unknown = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert_eq!(
            validate_magic_bytes(&unknown),
            Err(InvalidReason::UnrecognizedFormat)
        );
    }

    #[test]
    fn test_sniff_mp4_and_not_heic() {
        let mut mp4 = [0u8; 12];
        mp4[4..8].copy_from_slice(b"ftyp");
        mp4[8..12].copy_from_slice(b"isom");
        assert_eq!(sniff_video(&mp4), Some("video/mp4"));

        let mut heic = mp4;
        heic[8..12].copy_from_slice(b"heic");
        assert_eq!(sniff_video(&heic), None);
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("application/x-unknown"), "bin");
    }
}
