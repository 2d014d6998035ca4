//! Progress-callback trait for per-file batch events.
//!
//! Pass an [`Arc<dyn BatchProgressCallback>`] to [`crate::batch::run_batch`]
//! to observe a run as it moves through the input list. The CLI renders
//! these events as a progress bar; library callers can forward them to a
//! channel, a UI, or a database.
//!
//! # Example
//!
//! ```rust
//! use mistral_ocr::BatchProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct FailureCounter {
//!     failed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for FailureCounter {
//!     fn on_file_error(&self, _index: usize, _total: usize, file: &str, error: &str) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{file} failed: {error}");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the batch runner as it processes each input file.
///
/// Files are processed sequentially, so calls never overlap, but the trait
/// is `Send + Sync` so implementations can be shared with other tasks. All
/// methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is submitted.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the input list
    /// * `total` — number of input files
    /// * `file`  — the input as given on the command line
    fn on_file_start(&self, index: usize, total: usize, file: &str) {
        let _ = (index, total, file);
    }

    /// Called when a file produced its output document.
    fn on_file_complete(&self, index: usize, total: usize, file: &str, pages: usize, images: usize) {
        let _ = (index, total, file, pages, images);
    }

    /// Called when a file failed; `error` is the recorded message.
    fn on_file_error(&self, index: usize, total: usize, file: &str, error: &str) {
        let _ = (index, total, file, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        started_total: AtomicUsize,
        completed_total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.started_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _file: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _i: usize, _t: usize, _f: &str, _pages: usize, _images: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _file: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_files: usize, success_count: usize) {
            self.completed_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, "a.pdf");
        cb.on_file_complete(1, 2, "a.pdf", 3, 1);
        cb.on_file_error(2, 2, "b.doc", "Unsupported file type");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_batch_start(3);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        tracker.on_file_start(1, 3, "a.pdf");
        tracker.on_file_complete(1, 3, "a.pdf", 2, 0);
        tracker.on_file_start(2, 3, "b.png");
        tracker.on_file_complete(2, 3, "b.png", 1, 1);
        tracker.on_file_start(3, 3, "c.pdf");
        tracker.on_file_error(3, 3, "c.pdf", "HTTP 401");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_batch_complete(3, 2);
        assert_eq!(tracker.completed_total.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_file_start(1, 1, "x.pdf");
    }
}
