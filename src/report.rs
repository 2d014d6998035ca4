//! Per-file outcomes and the end-of-run summary.

use crate::output::FileResult;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// One input file's entry in the run report. Never mutated once added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub pages: usize,
    pub images: usize,
    pub output_file: Option<PathBuf>,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl FileOutcome {
    pub fn from_result(
        file: impl Into<String>,
        result: FileResult,
        estimated_cost: f64,
        actual_cost: f64,
    ) -> Self {
        Self {
            file: file.into(),
            pages: result.pages,
            images: result.image_count(),
            output_file: result.output_file,
            estimated_cost,
            actual_cost,
            warnings: result.warnings,
            errors: result.errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file)?;
        writeln!(f, "  Pages: {}", self.pages)?;
        writeln!(f, "  Images: {}", self.images)?;
        writeln!(f, "  Estimated Cost: ${:.4}", self.estimated_cost)?;
        write!(f, "  Actual Cost: ${:.4}", self.actual_cost)?;
        if let Some(ref path) = self.output_file {
            write!(f, "\n  Output: {}", path.display())?;
        }
        if !self.warnings.is_empty() {
            write!(f, "\n  Warnings: {}", self.warnings.join(", "))?;
        }
        if !self.errors.is_empty() {
            write!(f, "\n  Errors: {}", self.errors.join(", "))?;
        }
        Ok(())
    }
}

/// Aggregate numbers over every file in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub total_pages: usize,
    pub total_images: usize,
    pub total_estimated_cost: f64,
    pub total_actual_cost: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} files ({} failed), {} pages, {} images.\n\
             Total Estimated Cost: ${:.4}\n\
             Total Actual Cost: ${:.4}",
            self.total_files,
            self.failed_files,
            self.total_pages,
            self.total_images,
            self.total_estimated_cost,
            self.total_actual_cost
        )
    }
}

/// Append-only collection of [`FileOutcome`]s.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    files: Vec<FileOutcome>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, outcome: FileOutcome) {
        self.files.push(outcome);
    }

    pub fn files(&self) -> &[FileOutcome] {
        &self.files
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_files: self.files.len(),
            failed_files: self.files.iter().filter(|f| !f.is_success()).count(),
            total_pages: self.files.iter().map(|f| f.pages).sum(),
            total_images: self.files.iter().map(|f| f.images).sum(),
            total_estimated_cost: self.files.iter().map(|f| f.estimated_cost).sum(),
            total_actual_cost: self.files.iter().map(|f| f.actual_cost).sum(),
        }
    }

    /// JSON document with every outcome plus the summary.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::json!({
            "files": self.files,
            "summary": self.summary(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(file: &str, pages: usize, images: usize, errors: &[&str]) -> FileOutcome {
        FileOutcome {
            file: file.into(),
            pages,
            images,
            output_file: None,
            estimated_cost: pages as f64 * 0.001,
            actual_cost: pages as f64 * 0.001,
            warnings: Vec::new(),
            errors: errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn summary_aggregates() {
        let mut report = RunReport::new();
        report.add(outcome("a.pdf", 3, 2, &[]));
        report.add(outcome("b.png", 1, 0, &[]));
        report.add(outcome("c.doc", 0, 0, &["Unsupported file type: '.doc'"]));

        let s = report.summary();
        assert_eq!(s.total_files, 3);
        assert_eq!(s.failed_files, 1);
        assert_eq!(s.total_pages, 4);
        assert_eq!(s.total_images, 2);
        assert!((s.total_estimated_cost - 0.004).abs() < 1e-12);
        assert!(s.to_string().contains("Total Estimated Cost: $0.0040"));
    }

    #[test]
    fn outcome_display_lists_warnings_and_errors() {
        let mut o = outcome("x.pdf", 2, 1, &["boom"]);
        o.warnings = vec!["w1".into(), "w2".into()];
        let text = o.to_string();
        assert!(text.starts_with("File: x.pdf\n  Pages: 2\n  Images: 1\n"));
        assert!(text.contains("Estimated Cost: $0.0020"));
        assert!(text.contains("Warnings: w1, w2"));
        assert!(text.contains("Errors: boom"));
    }

    #[test]
    fn from_result_copies_counts() {
        let result = FileResult {
            pages: 5,
            warnings: vec!["w".into()],
            ..FileResult::default()
        };
        let o = FileOutcome::from_result("f.pdf", result, 0.5, 0.25);
        assert_eq!(o.pages, 5);
        assert_eq!(o.images, 0);
        assert_eq!(o.warnings, vec!["w".to_string()]);
        assert!(o.is_success());
    }

    #[test]
    fn json_has_files_and_summary() {
        let mut report = RunReport::new();
        report.add(outcome("a.pdf", 1, 0, &[]));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["files"][0]["file"], "a.pdf");
        assert_eq!(value["summary"]["total_pages"], 1);
    }
}
