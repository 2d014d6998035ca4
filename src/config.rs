//! Configuration types for batch OCR runs.
//!
//! Every knob lives in [`OcrConfig`], built via [`OcrConfigBuilder`]. The
//! builder starts from environment values (`.env` included, see
//! [`OcrConfigBuilder::from_env`]); CLI flags are then applied as setter
//! overrides and [`OcrConfigBuilder::build`] validates the result once.

use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";
pub const DEFAULT_API_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_LOG_PATH: &str = "./output/{basename}/process.log";

/// Highest page number accepted in a range expression.
pub const MAX_PAGE_NUMBER: usize = 100_000;

/// Configuration for a batch OCR run.
///
/// # Example
/// ```rust
/// use mistral_ocr::{OcrConfig, OutputFormat};
///
/// let config = OcrConfig::builder()
///     .api_key("sk-test")
///     .price_per_1000_pages(2.0)
///     .output_format(OutputFormat::Text)
///     .build()
///     .unwrap();
/// assert_eq!(config.output_format.extension(), "txt");
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// Bearer credential for the OCR service.
    pub api_key: String,

    /// Base URL of the REST API, without trailing slash.
    pub api_base_url: String,

    /// OCR model identifier sent with every request.
    pub model: String,

    /// Flat price per 1000 processed pages, used for cost estimates. Always > 0.
    pub price_per_1000_pages: f64,

    /// Format of the per-file document. Default: Markdown.
    pub output_format: OutputFormat,

    /// Root directory; each input gets its own `{output_dir}/{basename}/`.
    pub output_dir: PathBuf,

    /// Log file path; `{basename}` is replaced by the first input's base name.
    pub log_path_template: String,

    /// Maximum number of images the service extracts. `None` = service default.
    pub image_limit: Option<u32>,

    /// Minimum image edge in pixels. `None` = service default.
    pub image_min_size: Option<u32>,

    /// Page selection sent with each request. Default: all pages.
    pub pages: PageSelection,

    /// Transport timeout for a single HTTP request, in seconds. Default: 300.
    pub request_timeout_secs: u64,

    /// Lifetime of the signed URL issued for uploaded PDFs, in hours. Default: 60.
    pub signed_url_expiry_hours: u32,
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("price_per_1000_pages", &self.price_per_1000_pages)
            .field("output_format", &self.output_format)
            .field("output_dir", &self.output_dir)
            .field("log_path_template", &self.log_path_template)
            .field("image_limit", &self.image_limit)
            .field("image_min_size", &self.image_min_size)
            .field("pages", &self.pages)
            .finish()
    }
}

impl OcrConfig {
    /// Create a builder populated with built-in defaults (no environment).
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder::default()
    }

    /// Resolve the log file path for a run whose first input is `first_input`.
    pub fn log_path_for(&self, first_input: &str) -> PathBuf {
        PathBuf::from(
            self.log_path_template
                .replace("{basename}", &basename_no_ext(first_input)),
        )
    }
}

/// Base name of a path or URL without its extension: `a/b/report.v2.pdf` → `report.v2`.
pub fn basename_no_ext(input: &str) -> String {
    let last = input
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(input);
    Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| last.to_string())
}

/// Builder for [`OcrConfig`].
#[derive(Debug, Clone)]
pub struct OcrConfigBuilder {
    api_key: Option<String>,
    api_base_url: String,
    model: String,
    price_per_1000_pages: f64,
    output_format: OutputFormat,
    output_dir: PathBuf,
    log_path_template: String,
    image_limit: Option<u32>,
    image_min_size: Option<u32>,
    pages: PageSelection,
    request_timeout_secs: u64,
    signed_url_expiry_hours: u32,
}

impl Default for OcrConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            price_per_1000_pages: 1.0,
            output_format: OutputFormat::default(),
            output_dir: PathBuf::from("./output"),
            log_path_template: DEFAULT_LOG_PATH.to_string(),
            image_limit: None,
            image_min_size: None,
            pages: PageSelection::default(),
            request_timeout_secs: 300,
            signed_url_expiry_hours: 60,
        }
    }
}

impl OcrConfigBuilder {
    /// Start from the process environment.
    ///
    /// Load a `.env` file first (the CLI does this with `dotenvy`) if one
    /// should be honoured.
    pub fn from_env() -> Result<Self, OcrError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Start from an arbitrary key lookup. Unset and empty values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OcrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::default();

        builder.api_key = get("MISTRAL_API_KEY");
        if let Some(v) = get("MISTRAL_API_BASE_URL") {
            builder = builder.api_base_url(v);
        }
        if let Some(v) = get("MISTRAL_OCR_MODEL") {
            builder.model = v;
        }
        if let Some(v) = get("PRICE_PER_1000_PAGES") {
            builder.price_per_1000_pages = parse_env("PRICE_PER_1000_PAGES", &v)?;
        }
        if let Some(v) = get("DEFAULT_OUTPUT_FORMAT") {
            builder.output_format = v.parse()?;
        }
        if let Some(v) = get("DEFAULT_LOG_PATH") {
            builder.log_path_template = v;
        }
        if let Some(v) = get("DEFAULT_OUTPUT_DIR") {
            builder.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("DEFAULT_IMAGE_LIMIT") {
            builder = builder.image_limit(parse_env("DEFAULT_IMAGE_LIMIT", &v)?);
        }
        if let Some(v) = get("DEFAULT_IMAGE_MIN_SIZE") {
            builder = builder.image_min_size(parse_env("DEFAULT_IMAGE_MIN_SIZE", &v)?);
        }
        if let Some(v) = get("MISTRAL_OCR_TIMEOUT_SECS") {
            builder.request_timeout_secs = parse_env("MISTRAL_OCR_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("MISTRAL_SIGNED_URL_EXPIRY_HOURS") {
            builder.signed_url_expiry_hours = parse_env("MISTRAL_SIGNED_URL_EXPIRY_HOURS", &v)?;
        }

        Ok(builder)
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn price_per_1000_pages(mut self, price: f64) -> Self {
        self.price_per_1000_pages = price;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn log_path_template(mut self, template: impl Into<String>) -> Self {
        self.log_path_template = template.into();
        self
    }

    /// `0` means "let the service decide".
    pub fn image_limit(mut self, limit: u32) -> Self {
        self.image_limit = (limit > 0).then_some(limit);
        self
    }

    /// `0` means "let the service decide".
    pub fn image_min_size(mut self, px: u32) -> Self {
        self.image_min_size = (px > 0).then_some(px);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.pages = selection;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs.max(1);
        self
    }

    pub fn signed_url_expiry_hours(mut self, hours: u32) -> Self {
        self.signed_url_expiry_hours = hours.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, OcrError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(OcrError::MissingApiKey)?;

        if !(self.price_per_1000_pages.is_finite() && self.price_per_1000_pages > 0.0) {
            return Err(OcrError::InvalidConfig(format!(
                "PRICE_PER_1000_PAGES must be a positive number, got {}",
                self.price_per_1000_pages
            )));
        }

        Ok(OcrConfig {
            api_key,
            api_base_url: self.api_base_url,
            model: self.model,
            price_per_1000_pages: self.price_per_1000_pages,
            output_format: self.output_format,
            output_dir: self.output_dir,
            log_path_template: self.log_path_template,
            image_limit: self.image_limit,
            image_min_size: self.image_min_size,
            pages: self.pages,
            request_timeout_secs: self.request_timeout_secs,
            signed_url_expiry_hours: self.signed_url_expiry_hours,
        })
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, OcrError> {
    value.trim().parse().map_err(|_| {
        OcrError::InvalidConfig(format!("{key} has an invalid value: '{value}'"))
    })
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Format of the document written for each input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Assembled markdown, written verbatim (`.md`). (default)
    #[default]
    Markdown,
    /// Markdown with `#` and `*` stripped (`.txt`).
    Text,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
        }
    }

    /// Render the assembled markdown into this format.
    pub fn render(self, markdown: &str) -> String {
        match self {
            OutputFormat::Markdown => markdown.to_string(),
            OutputFormat::Text => crate::pipeline::assemble::to_plain_text(markdown),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "txt" | "text" => Ok(OutputFormat::Text),
            other => Err(OcrError::InvalidConfig(format!(
                "output format must be 'md' or 'txt', got '{other}'"
            ))),
        }
    }
}

/// Specifies which pages of a document the service should process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default). No `pages` field is sent.
    #[default]
    All,
    /// Zero-based, sorted, deduplicated page indices.
    Indices(Vec<usize>),
}

impl PageSelection {
    /// Parse a 1-based range expression such as `"1-3,5,7-9"`.
    ///
    /// A blank expression selects all pages. Page numbers above
    /// [`MAX_PAGE_NUMBER`] are rejected.
    pub fn parse(expr: &str) -> Result<Self, OcrError> {
        if expr.trim().is_empty() {
            return Ok(PageSelection::All);
        }

        let invalid = |reason: String| OcrError::InvalidPageRange {
            input: expr.to_string(),
            reason,
        };
        let page_number = |s: &str| -> Result<usize, OcrError> {
            let n: usize = s
                .trim()
                .parse()
                .map_err(|_| invalid(format!("'{}' is not a page number", s.trim())))?;
            if n == 0 {
                return Err(invalid("pages are 1-indexed, minimum is 1".into()));
            }
            if n > MAX_PAGE_NUMBER {
                return Err(invalid(format!("page {n} exceeds the maximum of {MAX_PAGE_NUMBER}")));
            }
            Ok(n)
        };

        let mut indices = Vec::new();
        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (page_number(start)?, page_number(end)?);
                    if start > end {
                        return Err(invalid(format!(
                            "range {start}-{end}: start must be <= end"
                        )));
                    }
                    indices.extend((start - 1)..end);
                }
                None => indices.push(page_number(part)? - 1),
            }
        }

        if indices.is_empty() {
            return Ok(PageSelection::All);
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(PageSelection::Indices(indices))
    }

    /// Zero-based indices to send to the service, or `None` for all pages.
    pub fn request_indices(&self) -> Option<&[usize]> {
        match self {
            PageSelection::All => None,
            PageSelection::Indices(v) => Some(v),
        }
    }

    /// Expand into indices, clamped to `[0, total)` when the page count is known.
    ///
    /// `All` with an unknown total yields an empty list.
    pub fn to_indices(&self, total_pages: Option<usize>) -> Vec<usize> {
        match (self, total_pages) {
            (PageSelection::All, Some(total)) => (0..total).collect(),
            (PageSelection::All, None) => Vec::new(),
            (PageSelection::Indices(v), Some(total)) => {
                v.iter().copied().filter(|&i| i < total).collect()
            }
            (PageSelection::Indices(v), None) => v.clone(),
        }
    }
}
