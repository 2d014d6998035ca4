//! Request and response shapes of the remote OCR API.
//!
//! Optional response fields are modelled as `Option` / `#[serde(default)]`
//! so a page without images or an image without payload deserialises
//! cleanly instead of failing the whole response.

use serde::{Deserialize, Serialize};

/// Body of `POST /ocr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRequest {
    pub model: String,
    pub document: DocumentSource,
    pub include_image_base64: bool,
    /// Zero-based page indices. Omitted = all pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_min_size: Option<u32>,
}

impl OcrRequest {
    pub fn new(model: impl Into<String>, document: DocumentSource) -> Self {
        Self {
            model: model.into(),
            document,
            include_image_base64: true,
            pages: None,
            image_limit: None,
            image_min_size: None,
        }
    }
}

/// Where the service fetches the document from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocumentSource {
    /// PDF reachable by URL (signed upload URL or user-supplied link).
    #[serde(rename = "document_url")]
    DocumentUrl { document_url: String },
    /// Image URL or inline `data:` URI.
    #[serde(rename = "image_url")]
    ImageUrl { image_url: String },
}

/// Body returned by `POST /ocr`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<PageResult>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage_info: Option<UsageInfo>,
}

/// One page of OCR output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page ordinal as reported by the service.
    pub index: u32,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub images: Vec<EmbeddedImage>,
}

/// One image extracted from a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Unique within one response; markdown refers to the image by this id.
    pub id: String,
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl EmbeddedImage {
    /// The payload, if present and non-empty.
    pub fn payload(&self) -> Option<&str> {
        self.image_base64.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: Option<u32>,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}

/// Body returned by `POST /files`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileUploadResponse {
    pub id: String,
}

/// Body returned by `GET /files/{id}/url`.
#[derive(Debug, Deserialize)]
pub(crate) struct SignedUrlResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_unset_options() {
        let req = OcrRequest::new(
            "mistral-ocr-latest",
            DocumentSource::DocumentUrl {
                document_url: "https://files/doc.pdf".into(),
            },
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "mistral-ocr-latest",
                "document": { "type": "document_url", "document_url": "https://files/doc.pdf" },
                "include_image_base64": true
            })
        );
    }

    #[test]
    fn request_includes_set_options() {
        let mut req = OcrRequest::new(
            "m",
            DocumentSource::ImageUrl {
                image_url: "data:image/png;base64,AAAA".into(),
            },
        );
        req.pages = Some(vec![0, 2]);
        req.image_limit = Some(3);
        req.image_min_size = Some(50);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["document"]["type"], "image_url");
        assert_eq!(value["pages"], json!([0, 2]));
        assert_eq!(value["image_limit"], 3);
        assert_eq!(value["image_min_size"], 50);
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let body = json!({
            "pages": [
                { "index": 0, "markdown": "# A", "images": [ { "id": "img-0.jpeg", "image_base64": null } ] },
                { "index": 1, "markdown": "B" }
            ],
            "usage_info": { "pages_processed": 2 }
        });
        let resp: OcrResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.pages.len(), 2);
        assert_eq!(resp.pages[0].images[0].payload(), None);
        assert!(resp.pages[1].images.is_empty());
        assert_eq!(resp.usage_info.unwrap().pages_processed, Some(2));
    }

    #[test]
    fn empty_payload_counts_as_absent() {
        let img = EmbeddedImage {
            id: "img-1".into(),
            image_base64: Some(String::new()),
        };
        assert_eq!(img.payload(), None);
    }
}
