//! Per-file OCR orchestration.
//!
//! [`OcrProcessor::process_file`] takes one input from "path on the command
//! line" to "document and images on disk":
//!
//! ```text
//! input
//!  │
//!  ├─ 1. Resolve   classify by extension, check the file is readable
//!  ├─ 2. Submit    upload PDF / inline image / pass URL through
//!  ├─ 3. Images    decode → sanitize → detect format → write {id}{ext}
//!  ├─ 4. Assemble  page headings + rewritten image references
//!  └─ 5. Write     {basename}.md or {basename}.txt (temp file + rename)
//! ```
//!
//! Any error in steps 1, 2 or 5 fails the file. Image problems only produce
//! warnings. Files already written before a failure are left in place.

use crate::api::{DocumentSource, OcrRequest, PageResult};
use crate::client::OcrClient;
use crate::config::OcrConfig;
use crate::error::{ImageError, OcrError};
use crate::output::{FileResult, SavedImage};
use crate::pipeline::assemble::{assemble, ReferenceRewriteMap};
use crate::pipeline::decode::{decode_image, to_data_uri};
use crate::pipeline::input::{self, InputKind, ResolvedInput};
use crate::pipeline::sanitize::sanitize;
use crate::pipeline::signature::ImageFormat;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// `tracing` target for image-sanitization warnings.
///
/// The CLI keeps these out of the console and sends them to the log file
/// only, since they carry payload fingerprints.
pub const SANITIZE_LOG_TARGET: &str = "mistral_ocr::sanitize";

/// Runs one input file through the OCR service and writes its outputs.
pub struct OcrProcessor {
    client: Arc<dyn OcrClient>,
}

impl OcrProcessor {
    pub fn new(client: Arc<dyn OcrClient>) -> Self {
        Self { client }
    }

    /// Process a single input file.
    ///
    /// Never fails: any error is logged and returned as a failed
    /// [`FileResult`] whose `errors` carries the message.
    pub async fn process_file(&self, input: &str, config: &OcrConfig) -> FileResult {
        match self.try_process(input, config).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error processing {}: {}", input, e);
                FileResult::failed(e.to_string())
            }
        }
    }

    async fn try_process(&self, input: &str, config: &OcrConfig) -> Result<FileResult, OcrError> {
        // ── Step 1: Resolve input ────────────────────────────────────────
        let resolved = input::resolve_input(input)?;
        let basename = input::output_basename(input);
        let out_dir = config.output_dir.join(&basename);
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|source| OcrError::OutputWriteFailed {
                path: out_dir.clone(),
                source,
            })?;

        // ── Step 2: Submit ───────────────────────────────────────────────
        let document = self.document_source(&resolved).await?;
        let mut request = OcrRequest::new(config.model.clone(), document);
        request.pages = config.pages.request_indices().map(<[usize]>::to_vec);
        request.image_limit = config.image_limit;
        request.image_min_size = config.image_min_size;

        info!("Submitting {} to {}", input, config.model);
        let response = self.client.process(&request).await?;
        debug!("Received {} pages for {}", response.pages.len(), input);

        // ── Step 3: Save images ──────────────────────────────────────────
        let mut result = FileResult::default();
        let mut rewrites = ReferenceRewriteMap::new();
        for page in &response.pages {
            result.pages += 1;
            save_page_images(page, &out_dir, &mut rewrites, &mut result).await?;
        }

        // ── Step 4: Assemble ─────────────────────────────────────────────
        let markdown = assemble(&response.pages, &rewrites);
        let document = config.output_format.render(&markdown);

        // ── Step 5: Write document ───────────────────────────────────────
        let extension = config.output_format.extension();
        let output_path = out_dir.join(format!("{basename}.{extension}"));
        write_atomic(&output_path, &document).await?;

        info!(
            "Processed {}: {} pages, {} images → {}",
            input,
            result.pages,
            result.image_count(),
            output_path.display()
        );
        result.output_file = Some(output_path);
        Ok(result)
    }

    async fn document_source(&self, resolved: &ResolvedInput) -> Result<DocumentSource, OcrError> {
        match resolved {
            ResolvedInput::Local {
                path,
                kind: InputKind::Pdf,
            } => {
                let document_url = self.client.upload_document(path).await?;
                Ok(DocumentSource::DocumentUrl { document_url })
            }
            ResolvedInput::Local {
                path,
                kind: InputKind::Image { mime_type },
            } => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|source| OcrError::ReadFailed {
                        path: path.clone(),
                        source,
                    })?;
                Ok(DocumentSource::ImageUrl {
                    image_url: to_data_uri(mime_type, &bytes),
                })
            }
            ResolvedInput::Remote {
                url,
                kind: InputKind::Pdf,
            } => Ok(DocumentSource::DocumentUrl {
                document_url: url.clone(),
            }),
            ResolvedInput::Remote {
                url,
                kind: InputKind::Image { .. },
            } => Ok(DocumentSource::ImageUrl {
                image_url: url.clone(),
            }),
        }
    }
}

/// Decode, sanitize and write every image on `page`, registering each
/// written file in `rewrites`.
async fn save_page_images(
    page: &PageResult,
    out_dir: &Path,
    rewrites: &mut ReferenceRewriteMap,
    result: &mut FileResult,
) -> Result<(), OcrError> {
    for image in &page.images {
        if !is_plain_file_name(&image.id) {
            let e = ImageError::UnsafeId {
                id: image.id.clone(),
            };
            warn!("Page {}: {}", page.index, e);
            result.warnings.push(e.to_string());
            continue;
        }

        let bytes = match decode_image(image) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping image on page {}: {}", page.index, e);
                result.warnings.push(e.to_string());
                continue;
            }
        };

        let sanitized = sanitize(bytes, &image.id, image.payload().unwrap_or_default());
        let format = ImageFormat::detect(&sanitized.bytes);
        if let Some(warning) = sanitized.warning {
            warn!(target: SANITIZE_LOG_TARGET, "{}", warning);
            result.warnings.push(warning.to_string());
        }

        let filename = format!("{}{}", image.id, format.extension());
        let path = out_dir.join(&filename);
        tokio::fs::write(&path, &sanitized.bytes)
            .await
            .map_err(|source| OcrError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;
        debug!("Saved image {} ({} bytes)", path.display(), sanitized.bytes.len());

        rewrites.register(&image.id, &filename);
        result.images.push(SavedImage {
            id: image.id.clone(),
            format,
            filename,
            path,
        });
    }
    Ok(())
}

/// True when `id` is exactly one normal path component, so joining it onto
/// the output directory cannot leave that directory.
fn is_plain_file_name(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !id.contains(['/', '\\'])
}

/// Write via a temp sibling and rename, so the document is never half-written.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), OcrError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(OcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}
