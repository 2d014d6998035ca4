//! Sequential batch loop over the input list.

use crate::config::{OcrConfig, PageSelection};
use crate::cost::CostEstimator;
use crate::pipeline::input::{self, InputKind};
use crate::pipeline::inspect::count_pdf_pages;
use crate::processor::OcrProcessor;
use crate::progress::BatchProgressCallback;
use crate::report::{FileOutcome, RunReport};
use std::path::Path;
use tracing::{debug, info};

/// Pages an input is expected to bill before it is submitted.
///
/// Local PDFs are opened to count pages and the selection is clamped to
/// that count. Everything else (images, URLs, unreadable or unsupported
/// inputs) estimates as one page, or the selection length for remote PDFs.
pub async fn estimate_pages(input: &str, pages: &PageSelection) -> usize {
    let Ok(InputKind::Pdf) = input::classify(input) else {
        return 1;
    };

    if input::is_url(input) {
        return pages.request_indices().map_or(1, <[usize]>::len);
    }

    match count_pdf_pages(Path::new(input)).await {
        Ok(total) => pages.to_indices(Some(total)).len(),
        Err(e) => {
            debug!("Page count unavailable for {}: {}", input, e);
            1
        }
    }
}

/// Process every input in order and collect one outcome per input.
///
/// Per-file failures are recorded in the report; the loop always runs to
/// the end of `inputs`.
pub async fn run_batch(
    inputs: &[String],
    config: &OcrConfig,
    processor: &OcrProcessor,
    estimator: &CostEstimator,
    progress: &dyn BatchProgressCallback,
) -> RunReport {
    let total = inputs.len();
    let mut report = RunReport::new();
    progress.on_batch_start(total);

    for (i, file) in inputs.iter().enumerate() {
        let index = i + 1;
        info!("--- Processing {} ---", file);
        progress.on_file_start(index, total, file);

        let estimated_pages = estimate_pages(file, &config.pages).await;
        let estimated_cost = estimator.estimate(estimated_pages);

        let result = processor.process_file(file, config).await;
        let actual_cost = estimator.estimate(result.pages);
        let outcome = FileOutcome::from_result(file.as_str(), result, estimated_cost, actual_cost);

        match outcome.errors.first() {
            None => progress.on_file_complete(index, total, file, outcome.pages, outcome.images),
            Some(error) => progress.on_file_error(index, total, file, error),
        }
        report.add(outcome);
    }

    let summary = report.summary();
    progress.on_batch_complete(total, total - summary.failed_files);
    report
}
