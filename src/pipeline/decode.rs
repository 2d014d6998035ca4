//! Payload decoding: base64 text from the OCR response → raw image bytes.
//!
//! The service may return a bare base64 string or a full data URI
//! (`data:image/jpeg;base64,/9j/...`). The `data:` header is cut at the
//! first comma and ASCII whitespace (line wrapping) is dropped; whatever
//! remains must be standard base64.

use crate::api::EmbeddedImage;
use crate::error::ImageError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Strip a `data:...,` header if present.
pub fn strip_data_uri(payload: &str) -> &str {
    match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => payload,
    }
}

/// Decode an embedded image payload.
///
/// Returns `Ok(None)` when the image has no payload; there is nothing to
/// write and nothing to report.
pub fn decode_image(image: &EmbeddedImage) -> Result<Option<Vec<u8>>, ImageError> {
    let Some(payload) = image.payload() else {
        return Ok(None);
    };

    let data: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(&data)
        .map_err(|e| ImageError::DecodeFailed {
            id: image.id.clone(),
            detail: e.to_string(),
        })?;

    debug!("Decoded image {} → {} bytes", image.id, bytes.len());
    Ok(Some(bytes))
}

/// Encode a local file's bytes as an inline data URI for the request body.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}
