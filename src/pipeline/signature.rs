//! Image family detection from leading magic bytes.
//!
//! The OCR service labels every extracted image as JPEG regardless of what
//! it actually is, so the on-disk extension is derived from the bytes alone.

use serde::{Deserialize, Serialize};

/// Image families recognised by their signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    /// No known signature at offset 0. Written as `.bin`.
    Unknown,
}

/// Known signatures in match priority order.
pub const SIGNATURES: &[(&[u8], ImageFormat)] = &[
    (b"\xFF\xD8\xFF", ImageFormat::Jpeg),
    (b"\x89PNG\r\n\x1a\n", ImageFormat::Png),
    (b"GIF87a", ImageFormat::Gif),
    (b"GIF89a", ImageFormat::Gif),
    (b"BM", ImageFormat::Bmp),
];

impl ImageFormat {
    /// Detect the format from the first bytes of `bytes`. Never fails.
    pub fn detect(bytes: &[u8]) -> Self {
        matching_signature(bytes)
            .map(|(_, format)| format)
            .unwrap_or(ImageFormat::Unknown)
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => ".jpeg",
            ImageFormat::Png => ".png",
            ImageFormat::Gif => ".gif",
            ImageFormat::Bmp => ".bmp",
            ImageFormat::Unknown => ".bin",
        }
    }
}

/// The first signature (in priority order) that `bytes` starts with.
pub(crate) fn matching_signature(bytes: &[u8]) -> Option<(&'static [u8], ImageFormat)> {
    SIGNATURES
        .iter()
        .find(|(sig, _)| bytes.starts_with(sig))
        .map(|&(sig, format)| (sig, format))
}
