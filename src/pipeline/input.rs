//! Input resolution: classify a user-supplied path or URL.
//!
//! Local inputs are checked for existence and read permission up front so a
//! typo fails with a clear message instead of an opaque upload error. URLs
//! are passed to the service as-is; it fetches them itself.

use crate::config::basename_no_ext;
use crate::error::OcrError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions sent inline as base64 images.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".tiff"];

/// What kind of document an input is, by extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Submitted as a document URL (uploaded first when local).
    Pdf,
    /// Submitted as an image URL or inline data URI.
    Image { mime_type: String },
}

/// A classified input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// Input is a readable local file.
    Local { path: PathBuf, kind: InputKind },
    /// Input is an HTTP(S) URL fetched by the service.
    Remote { url: String, kind: InputKind },
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Lower-cased extension including the dot, or `""`.
pub fn extension_of(input: &str) -> String {
    let name = if is_url(input) {
        input
            .split(['?', '#'])
            .next()
            .unwrap_or(input)
            .rsplit('/')
            .next()
            .unwrap_or("")
    } else {
        input
    };
    Path::new(name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

/// MIME type for an image extension: `.jpg` → `image/jpeg`, else `image/{ext}`.
pub fn image_mime_type(extension: &str) -> String {
    match extension {
        ".jpg" => "image/jpeg".to_string(),
        other => format!("image/{}", other.trim_start_matches('.')),
    }
}

/// Classify an input by its extension.
pub fn classify(input: &str) -> Result<InputKind, OcrError> {
    let extension = extension_of(input);
    if extension == ".pdf" {
        Ok(InputKind::Pdf)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(InputKind::Image {
            mime_type: image_mime_type(&extension),
        })
    } else {
        Err(OcrError::UnsupportedFileType {
            path: PathBuf::from(input),
            extension,
        })
    }
}

/// Resolve and classify an input string.
pub fn resolve_input(input: &str) -> Result<ResolvedInput, OcrError> {
    let kind = classify(input)?;
    if is_url(input) {
        debug!("Resolved remote input: {}", input);
        return Ok(ResolvedInput::Remote {
            url: input.to_string(),
            kind,
        });
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        return Err(OcrError::FileNotFound { path });
    }
    match std::fs::File::open(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(OcrError::PermissionDenied { path });
        }
        Err(source) => return Err(OcrError::ReadFailed { path, source }),
    }

    debug!("Resolved local input: {}", path.display());
    Ok(ResolvedInput::Local { path, kind })
}

/// Output directory name for an input: its base name without extension.
pub fn output_basename(input: &str) -> String {
    basename_no_ext(input.split(['?', '#']).next().unwrap_or(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn classify_by_extension() {
        assert_eq!(classify("a/Report.PDF").unwrap(), InputKind::Pdf);
        assert_eq!(
            classify("scan.jpg").unwrap(),
            InputKind::Image {
                mime_type: "image/jpeg".into()
            }
        );
        assert_eq!(
            classify("scan.tiff").unwrap(),
            InputKind::Image {
                mime_type: "image/tiff".into()
            }
        );
        assert_eq!(
            classify("https://host/p/photo.png?sig=abc").unwrap(),
            InputKind::Image {
                mime_type: "image/png".into()
            }
        );
    }

    #[test]
    fn unsupported_extensions_fail() {
        for input in ["notes.docx", "archive", "image.gif"] {
            assert!(matches!(
                classify(input),
                Err(OcrError::UnsupportedFileType { .. })
            ));
        }
    }

    #[test]
    fn missing_local_file_fails() {
        let err = resolve_input("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, OcrError::FileNotFound { .. }));
    }

    #[test]
    fn remote_input_is_not_touched() {
        let resolved = resolve_input("https://example.com/files/paper.pdf").unwrap();
        assert_eq!(
            resolved,
            ResolvedInput::Remote {
                url: "https://example.com/files/paper.pdf".into(),
                kind: InputKind::Pdf
            }
        );
    }

    #[test]
    fn local_file_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();
        let resolved = resolve_input(path.to_str().unwrap()).unwrap();
        assert_eq!(
            resolved,
            ResolvedInput::Local {
                path,
                kind: InputKind::Image {
                    mime_type: "image/png".into()
                },
            }
        );
    }

    #[test]
    fn output_basename_strips_query() {
        assert_eq!(output_basename("https://h/x/paper.pdf?token=1"), "paper");
        assert_eq!(output_basename("dir/scan.jpeg"), "scan");
    }
}
