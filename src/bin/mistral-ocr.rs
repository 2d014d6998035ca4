//! CLI binary for mistral-ocr.
//!
//! A thin shim over the library crate that maps CLI flags and `.env`
//! values to `OcrConfig`, sets up logging and prints the run report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mistral_ocr::{
    run_batch, BatchProgressCallback, CostEstimator, MistralClient, NoopProgressCallback,
    OcrConfig, OcrConfigBuilder, OcrError, OcrProcessor, OutputFormat, PageSelection,
    ProgressCallback, SANITIZE_LOG_TARGET,
};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::{filter_fn, FilterExt, LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the input files, one log line
/// per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(0);
        bar.set_style(style);
        bar.set_prefix("OCR");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_files} file(s)…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, file: &str) {
        self.bar.set_message(file.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, file: &str, pages: usize, images: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            file,
            dim(&format!("{pages} pages, {images} images")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, file: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            file,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} file(s) processed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) processed  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One PDF, markdown output under ./output/report/
  mistral-ocr --input report.pdf

  # Several files, plain text, custom output directory
  mistral-ocr --input a.pdf scan.png --output-format txt --output-dir ./ocr

  # Selected pages, at most 10 images of at least 100px
  mistral-ocr --input book.pdf --page-ranges 1-3,5,7-9 --image-limit 10 --image-min-size 100

  # Machine-readable report
  mistral-ocr --input report.pdf --json > report.json

ENVIRONMENT VARIABLES (also read from .env):
  MISTRAL_API_KEY                  API key (required)
  PRICE_PER_1000_PAGES             Price used for cost estimates (default 1.0)
  DEFAULT_OUTPUT_FORMAT            md or txt (default md)
  DEFAULT_OUTPUT_DIR               Output root (default ./output)
  DEFAULT_LOG_PATH                 Log file; {basename} = first input (default ./output/{basename}/process.log)
  DEFAULT_IMAGE_LIMIT              Max extracted images, 0 = service default
  DEFAULT_IMAGE_MIN_SIZE           Min image size in px, 0 = service default
  MISTRAL_OCR_MODEL                OCR model (default mistral-ocr-latest)
  MISTRAL_API_BASE_URL             API base URL (default https://api.mistral.ai/v1)
  MISTRAL_OCR_TIMEOUT_SECS         HTTP timeout per request (default 300)
  MISTRAL_SIGNED_URL_EXPIRY_HOURS  Lifetime of upload URLs (default 60)
  RUST_LOG                         Console log filter override
"#;

/// Batch OCR of PDFs and images with the Mistral OCR API.
#[derive(Parser, Debug)]
#[command(
    name = "mistral-ocr",
    version,
    about = "Batch OCR of PDFs and images with the Mistral OCR API",
    long_about = "Send PDF and image files to the Mistral OCR API and write one Markdown or \
plain-text document per input, together with the embedded images, under the output directory. \
Prints a per-file report with page counts and estimated cost.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF or image files (local paths or HTTP/HTTPS URLs).
    #[arg(long, num_args = 1.., required = true)]
    input: Vec<String>,

    /// Output format (default: md).
    #[arg(long, value_enum)]
    output_format: Option<FormatArg>,

    /// Output root directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log file path.
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Page ranges, e.g. 1-3,5,7-9.
    #[arg(long)]
    page_ranges: Option<String>,

    /// Max images to extract.
    #[arg(long)]
    image_limit: Option<u32>,

    /// Minimum image size (pixels).
    #[arg(long)]
    image_min_size: Option<u32>,

    /// Override price per 1000 pages.
    #[arg(long)]
    price_per_1000_pages: Option<f64>,

    /// OCR model ID.
    #[arg(long)]
    model: Option<String>,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Show a progress bar over the input files.
    #[arg(long)]
    progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress console output except errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Report blocks go to the log file under this target; the console gets
/// them on stdout instead.
const REPORT_LOG_TARGET: &str = "mistral_ocr::report";

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Md,
    Txt,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Md => OutputFormat::Markdown,
            FormatArg::Txt => OutputFormat::Text,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Build config ─────────────────────────────────────────────────────
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) if e.is_config() => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    // ── Logging setup ────────────────────────────────────────────────────
    let log_path = match cli.log_path {
        Some(ref path) => path.clone(),
        None => config.log_path_for(&cli.input[0]),
    };
    let show_progress = cli.progress && !cli.quiet && !cli.json;
    init_logging(&log_path, &cli, show_progress)?;
    info!("Starting Mistral OCR CLI");

    let estimator = CostEstimator::new(config.price_per_1000_pages);
    if !cli.quiet && !cli.json {
        println!("{}", estimator.pricing_info());
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let client = MistralClient::new(&config).context("Failed to create OCR client")?;
    let processor = OcrProcessor::new(Arc::new(client));
    let progress: ProgressCallback = if show_progress {
        CliProgressCallback::new() as ProgressCallback
    } else {
        Arc::new(NoopProgressCallback)
    };

    let report = run_batch(&cli.input, &config, &processor, &estimator, progress.as_ref()).await;

    // ── Report ───────────────────────────────────────────────────────────
    let print_report = report_to_stdout(&cli);
    for outcome in report.files() {
        info!(target: REPORT_LOG_TARGET, "{}", outcome);
        if print_report {
            println!("{outcome}");
        }
    }
    info!(target: REPORT_LOG_TARGET, "{}", report.summary());
    if print_report {
        println!("{}", report.summary());
    }

    if cli.json {
        let json = report.to_json().context("Failed to serialise report")?;
        println!("{json}");
    }

    info!("Mistral OCR CLI finished.");
    Ok(())
}

/// Human-readable report on stdout; the progress bar does not suppress it.
fn report_to_stdout(cli: &Cli) -> bool {
    !cli.quiet && !cli.json
}

/// Environment values first, then any CLI flag that was given.
fn build_config(cli: &Cli) -> Result<OcrConfig, OcrError> {
    let mut builder = OcrConfigBuilder::from_env()?;

    if let Some(format) = cli.output_format {
        builder = builder.output_format(format.into());
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(ref expr) = cli.page_ranges {
        builder = builder.pages(PageSelection::parse(expr)?);
    }
    if let Some(limit) = cli.image_limit {
        builder = builder.image_limit(limit);
    }
    if let Some(px) = cli.image_min_size {
        builder = builder.image_min_size(px);
    }
    if let Some(price) = cli.price_per_1000_pages {
        builder = builder.price_per_1000_pages(price);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }

    builder.build()
}

/// File layer with every record of this crate, console layer on stderr
/// without sanitization details or report blocks.
fn init_logging(log_path: &Path, cli: &Cli, show_progress: bool) -> Result<()> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let file_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_filter(
            Targets::new()
                .with_default(LevelFilter::WARN)
                .with_target("mistral_ocr", file_level),
        );

    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let console_level = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(
            console_filter.and(filter_fn(|meta| {
                meta.target() != SANITIZE_LOG_TARGET && meta.target() != REPORT_LOG_TARGET
            })),
        );

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();
    Ok(())
}
