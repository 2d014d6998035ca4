//! PDF page counting for cost estimates.
//!
//! lopdf parses synchronously, so the work runs on the blocking pool.

use crate::error::OcrError;
use std::path::Path;
use tracing::debug;

/// Number of pages in a local PDF.
pub async fn count_pdf_pages(pdf_path: &Path) -> Result<usize, OcrError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || count_pdf_pages_blocking(&path))
        .await
        .map_err(|e| OcrError::Internal(format!("Page-count task panicked: {}", e)))?
}

fn count_pdf_pages_blocking(pdf_path: &Path) -> Result<usize, OcrError> {
    let document = lopdf::Document::load(pdf_path).map_err(|e| OcrError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let pages = document.get_pages().len();
    debug!("{} has {} pages", pdf_path.display(), pages);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object};

    fn write_pdf(path: &Path, page_count: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        write_pdf(&path, 3);
        assert_eq!(count_pdf_pages(&path).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        let err = count_pdf_pages(&path).await.unwrap_err();
        assert!(matches!(err, OcrError::CorruptPdf { .. }), "{err}");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = count_pdf_pages(Path::new("/no/such/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::CorruptPdf { .. }));
    }
}
