//! Remote OCR client.
//!
//! [`OcrClient`] is the seam between the orchestrator and the network: the
//! processor only needs "turn a local PDF into a fetchable URL" and "run OCR
//! on this request". [`MistralClient`] implements both against the Mistral
//! REST API; tests plug in an in-process fake.

use crate::api::{FileUploadResponse, OcrRequest, OcrResponse, SignedUrlResponse};
use crate::config::OcrConfig;
use crate::error::OcrError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Async OCR backend.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Upload a local PDF and return a URL the OCR endpoint can fetch.
    async fn upload_document(&self, path: &Path) -> Result<String, OcrError>;

    /// Run OCR and return the per-page results.
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, OcrError>;
}

/// [`OcrClient`] over the Mistral REST API.
pub struct MistralClient {
    api_key: String,
    base_url: String,
    signed_url_expiry_hours: u32,
    client: reqwest::Client,
}

impl MistralClient {
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| OcrError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.clone(),
            signed_url_expiry_hours: config.signed_url_expiry_hours,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, OcrError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| OcrError::Transport {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await.map_err(|e| OcrError::Transport {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })?;
        debug!("{} → {} bytes", endpoint, raw.len());

        serde_json::from_str(&raw).map_err(|e| OcrError::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl OcrClient for MistralClient {
    async fn upload_document(&self, path: &Path) -> Result<String, OcrError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| OcrError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        info!("Uploading {} ({} bytes)", file_name, data.len());

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| OcrError::Internal(format!("multipart: {e}")))?;
        let form = Form::new().part("file", part).text("purpose", "ocr");

        let upload: FileUploadResponse = self
            .send_json("/files", self.client.post(self.url("/files")).multipart(form))
            .await?;
        debug!("Uploaded file_id={}", upload.id);

        let signed: SignedUrlResponse = self
            .send_json(
                "/files/{id}/url",
                self.client
                    .get(self.url(&format!("/files/{}/url", upload.id)))
                    .query(&[("expiry", self.signed_url_expiry_hours)]),
            )
            .await?;

        Ok(signed.url)
    }

    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, OcrError> {
        let response: OcrResponse = self
            .send_json("/ocr", self.client.post(self.url("/ocr")).json(request))
            .await?;

        if let Some(ref usage) = response.usage_info {
            debug!(
                "Usage: pages_processed={:?} doc_size_bytes={:?}",
                usage.pages_processed, usage.doc_size_bytes
            );
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let config = OcrConfig::builder()
            .api_key("k")
            .api_base_url("http://localhost:8080/v1/")
            .build()
            .unwrap();
        let client = MistralClient::new(&config).unwrap();
        assert_eq!(client.url("/ocr"), "http://localhost:8080/v1/ocr");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let config = OcrConfig::builder()
            .api_key("k")
            .api_base_url("http://127.0.0.1:9")
            .request_timeout_secs(2)
            .build()
            .unwrap();
        let client = MistralClient::new(&config).unwrap();
        let request = OcrRequest::new(
            "m",
            crate::api::DocumentSource::DocumentUrl {
                document_url: "https://example.com/a.pdf".into(),
            },
        );
        let err = client.process(&request).await.unwrap_err();
        assert!(matches!(err, OcrError::Transport { .. }), "{err}");
    }

    #[tokio::test]
    async fn missing_upload_file_is_a_read_error() {
        let config = OcrConfig::builder().api_key("k").build().unwrap();
        let client = MistralClient::new(&config).unwrap();
        let err = client
            .upload_document(Path::new("/no/such/input.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::ReadFailed { .. }));
    }
}
