//! Progress-callback trait for per-page and per-target events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as a run OCRs pages and dispatches targets.
//!
//! # Example
//!
//! ```rust
//! use edgequake_translit::{PipelineConfig, RunProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     targets: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_target_complete(&self, target: &str, _output_len: usize) {
//!         self.targets.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{target} done");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { targets: AtomicUsize::new(0) });
//! let config = PipelineConfig::builder()
//!     .progress_callback(cb as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as a run progresses.
///
/// All methods default to no-ops. Page events may arrive from several tasks
/// when `ocr_concurrency > 1`, hence `Send + Sync`.
pub trait RunProgressCallback: Send + Sync {
    /// Called once the document kind is known and acquisition starts.
    fn on_acquire_start(&self, document: &str, kind: &str) {
        let _ = (document, kind);
    }

    /// Called once the page count of a PDF is known (1 for images).
    fn on_ocr_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is sent to the OCR engine (1-indexed).
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been recognised.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called when the OCR engine fails on a page.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called after classification, before any target is dispatched.
    fn on_detected(&self, script: &str, source_scheme: &str) {
        let _ = (script, source_scheme);
    }

    /// Called before the first transliteration call.
    fn on_dispatch_start(&self, total_targets: usize) {
        let _ = total_targets;
    }

    fn on_target_start(&self, target: &str) {
        let _ = target;
    }

    /// Called when a target produced output.
    fn on_target_complete(&self, target: &str, output_len: usize) {
        let _ = (target, output_len);
    }

    /// Called when the backend rejected a target; sibling targets continue.
    fn on_target_error(&self, target: &str, error: &str) {
        let _ = (target, error);
    }

    /// Called once after every target has been attempted.
    fn on_run_complete(&self, total_targets: usize, success_count: usize) {
        let _ = (total_targets, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        pages: AtomicUsize,
        errors: Mutex<Vec<String>>,
        completed: AtomicUsize,
    }

    impl RunProgressCallback for Recorder {
        fn on_page_complete(&self, _page: usize, _total: usize, _len: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_target_error(&self, target: &str, _error: &str) {
            self.errors.lock().unwrap().push(target.to_string());
        }

        fn on_run_complete(&self, _total: usize, success_count: usize) {
            self.completed.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_acquire_start("a.pdf", "pdf");
        cb.on_ocr_start(2);
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 10);
        cb.on_page_error(2, 2, "boom");
        cb.on_detected("Latin", "ITRANS");
        cb.on_dispatch_start(1);
        cb.on_target_start("DEVANAGARI");
        cb.on_target_complete("DEVANAGARI", 5);
        cb.on_target_error("THAI", "unsupported");
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn recorder_receives_events_through_arc_dyn() {
        let rec = Arc::new(Recorder::default());
        let cb: ProgressCallback = rec.clone();
        cb.on_page_complete(1, 1, 3);
        cb.on_target_error("Thai", "unsupported scheme 'Thai'");
        cb.on_run_complete(2, 1);
        assert_eq!(rec.pages.load(Ordering::SeqCst), 1);
        assert_eq!(*rec.errors.lock().unwrap(), vec!["Thai".to_string()]);
        assert_eq!(rec.completed.load(Ordering::SeqCst), 1);
    }
}
