//! Result types produced by the processor for one input file.

use crate::pipeline::signature::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An embedded image after decoding, sanitization and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedImage {
    /// Identifier assigned by the OCR service.
    pub id: String,
    /// Format detected after sanitization.
    pub format: ImageFormat,
    /// `{id}{extension}`.
    pub filename: String,
    /// Where the bytes were written.
    pub path: PathBuf,
}

/// Outcome of processing a single input file.
///
/// A failed file has zero pages, no images, no output file and at least
/// one entry in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    /// Pages returned by the service.
    pub pages: usize,
    /// Images written to the output directory, in response order.
    pub images: Vec<SavedImage>,
    /// The markdown or text document, when the run got that far.
    pub output_file: Option<PathBuf>,
    /// Sanitization notices and skipped images.
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl FileResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_is_empty() {
        let r = FileResult::failed("Unsupported file type: '.doc'");
        assert_eq!(r.pages, 0);
        assert_eq!(r.image_count(), 0);
        assert!(r.output_file.is_none());
        assert!(!r.is_success());
    }
}
