//! Progress-callback trait for per-document export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive events
//! as the orchestrator walks the document list. The CLI uses it to drive a
//! terminal progress bar; library users can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2pdf::{ExportConfig, ExportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counting(AtomicUsize);
//!
//! impl ExportProgressCallback for Counting {
//!     fn on_document_complete(&self, index: usize, total: usize, _output: &std::path::Path) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} done");
//!     }
//! }
//!
//! let config = ExportConfig::builder()
//!     .progress_callback(Arc::new(Counting(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes each document.
///
/// Documents are processed one at a time, so calls never overlap, but the
/// trait is `Send + Sync` so configs can be shared across tasks. All methods
/// default to no-ops.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once, after enumeration, when at least one document was found.
    fn on_export_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a document is read.
    ///
    /// # Arguments
    /// * `index`: 1-based position in the sorted document list
    /// * `total`: number of documents in the run
    /// * `name`: source file name, e.g. `notes.md`
    fn on_document_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when the PDF for a document has been written.
    fn on_document_complete(&self, index: usize, total: usize, output: &Path) {
        let _ = (index, total, output);
    }

    /// Called when a document failed; the run continues.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_export_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;
