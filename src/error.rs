//! Error types for the mistral-ocr library.
//!
//! Two error types cover two failure scopes:
//!
//! * [`OcrError`] — **Fatal for one input file** (unsupported type, upload
//!   rejected, output not writable) or, for the configuration variants, fatal
//!   for the whole run. The batch loop records it on that file's outcome and
//!   moves on to the next file.
//!
//! * [`ImageError`] — **Non-fatal**: one embedded image could not be decoded
//!   or carries an id that cannot be used as a file name.
//!   The image is skipped and recorded as a warning; the remaining images and
//!   pages of the same file are still written.
//!
//! Sanitization results are neither: they are structured warnings, see
//! [`crate::pipeline::sanitize::SanitizeWarning`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mistral-ocr library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input's extension is not one the OCR service accepts.
    #[error("Unsupported file type: '{extension}' ({path})")]
    UnsupportedFileType { path: PathBuf, extension: String },

    /// The input exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// lopdf could not parse the document (page counting only).
    #[error("PDF '{path}' could not be parsed: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Remote service errors ─────────────────────────────────────────────
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("Request to {endpoint} failed: {detail}")]
    Transport { endpoint: String, detail: String },

    /// The service answered with a non-success status.
    #[error("OCR API error on {endpoint} (HTTP {status}): {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The service answered 2xx but the body did not match the expected shape.
    #[error("Unexpected response from {endpoint}: {detail}")]
    InvalidResponse { endpoint: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API credential in the environment, `.env`, or builder.
    #[error("MISTRAL_API_KEY is not set in the environment or .env file.")]
    MissingApiKey,

    /// Builder or environment validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A page range expression could not be parsed.
    #[error("Invalid page range '{input}': {reason}")]
    InvalidPageRange { input: String, reason: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// True for errors that abort the run before any file is processed.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            OcrError::MissingApiKey | OcrError::InvalidConfig(_) | OcrError::InvalidPageRange { .. }
        )
    }
}

/// A non-fatal error for a single embedded image.
///
/// The processor logs it, records it among the file's warnings and
/// continues with the next image.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageError {
    /// The base64 payload could not be decoded.
    #[error("Failed to decode base64 for image {id}: {detail}")]
    DecodeFailed { id: String, detail: String },

    /// The id is not a plain file name and would write outside the
    /// per-file output directory.
    #[error("Skipping image with unsafe id '{id}': not a plain file name")]
    UnsafeId { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_keeps_body_verbatim() {
        let e = OcrError::Api {
            endpoint: "/ocr".into(),
            status: 422,
            body: "{\"detail\":\"bad document\"}".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("HTTP 422"), "got: {msg}");
        assert!(msg.contains("{\"detail\":\"bad document\"}"));
    }

    #[test]
    fn unsupported_type_display() {
        let e = OcrError::UnsupportedFileType {
            path: PathBuf::from("notes.docx"),
            extension: ".docx".into(),
        };
        assert!(e.to_string().starts_with("Unsupported file type: '.docx'"));
    }

    #[test]
    fn config_errors_are_flagged() {
        assert!(OcrError::MissingApiKey.is_config());
        assert!(OcrError::InvalidConfig("x".into()).is_config());
        assert!(!OcrError::Internal("x".into()).is_config());
    }

    #[test]
    fn image_decode_display() {
        let e = ImageError::DecodeFailed {
            id: "img-3.jpeg".into(),
            detail: "Invalid byte 58, offset 4.".into(),
        };
        assert!(e.to_string().contains("img-3.jpeg"));
    }
}
