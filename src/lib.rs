//! # mistral-ocr
//!
//! Batch OCR of PDFs and images through the Mistral OCR API, producing one
//! Markdown (or plain-text) document per input plus the embedded images.
//!
//! ## Why this crate?
//!
//! The OCR service returns page markdown that refers to images by opaque ids
//! and ships the images as base64 blobs that are sometimes prefixed with
//! stray bytes. This crate repairs those payloads, names each image file by
//! its real format, rewrites the markdown references to match, and keeps a
//! per-file report with page counts and cost estimates.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input (path or URL)
//!  │
//!  ├─ 1. Input     classify .pdf / image, check readability
//!  ├─ 2. Submit    upload PDF or inline image → OCR endpoint
//!  ├─ 3. Sanitize  strip leading junk before the image signature
//!  ├─ 4. Save      {id}.{jpeg,png,gif,bmp,bin} per detected format
//!  ├─ 5. Assemble  "# Page N" headings + rewritten image references
//!  └─ 6. Report    pages, images, estimated / actual cost per file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mistral_ocr::{
//!     run_batch, CostEstimator, MistralClient, NoopProgressCallback, OcrConfigBuilder,
//!     OcrProcessor,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads MISTRAL_API_KEY, PRICE_PER_1000_PAGES, ... from the environment
//!     let config = OcrConfigBuilder::from_env()?.build()?;
//!     let processor = OcrProcessor::new(Arc::new(MistralClient::new(&config)?));
//!     let estimator = CostEstimator::new(config.price_per_1000_pages);
//!
//!     let inputs = vec!["report.pdf".to_string()];
//!     let report = run_batch(&inputs, &config, &processor, &estimator, &NoopProgressCallback).await;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mistral-ocr` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! mistral-ocr = { version = "0.2", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod batch;
pub mod client;
pub mod config;
pub mod cost;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{estimate_pages, run_batch};
pub use client::{MistralClient, OcrClient};
pub use config::{OcrConfig, OcrConfigBuilder, OutputFormat, PageSelection};
pub use cost::CostEstimator;
pub use error::{ImageError, OcrError};
pub use output::{FileResult, SavedImage};
pub use processor::{OcrProcessor, SANITIZE_LOG_TARGET};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{FileOutcome, RunReport, RunSummary};
