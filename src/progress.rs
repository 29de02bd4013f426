//! Progress-callback trait for per-document extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the batch processes each document and as the configuration
//! search scores each OCR candidate.
//!
//! The trait is `Send + Sync` because documents run on blocking worker
//! threads and, with `concurrency > 1`, several of them at once.
//!
//! # Example
//!
//! ```rust
//! use scan2txt::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     finished: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("document {}/{} done ({} chars)", index + 1, total, chars);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { finished: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the extraction pipeline as it processes documents.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// With `concurrency > 1`, `on_document_*` and `on_candidate_scored` may be
/// called concurrently from different threads. Implementations must protect
/// shared mutable state (e.g. `Mutex`, `AtomicUsize`).
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before the first document of a batch starts.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called when a document is picked up.
    ///
    /// # Arguments
    /// * `index` — 0-indexed position in the batch input list
    /// * `total` — number of documents in the batch
    /// * `path`  — the source PDF
    fn on_document_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called after each OCR configuration has been scored.
    ///
    /// `score` is `None` when the configuration could not be rendered.
    fn on_candidate_scored(&self, path: &Path, dpi: u32, psm: u8, score: Option<f64>) {
        let _ = (path, dpi, psm, score);
    }

    /// Called when a document produced text and the output was written.
    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        let _ = (index, total, chars);
    }

    /// Called when a document failed (no output text, or output not written).
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
