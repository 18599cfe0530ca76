//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::convert_batch`] works through its sources.
//!
//! # Example
//!
//! ```rust
//! use chatmark::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, markup_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Document {}/{} done ({} bytes)", index, total, markup_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by batch conversion as it processes each document.
///
/// Documents are read concurrently, so `on_document_*` methods may be called
/// from different tasks at once and out of index order. All methods default
/// to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any document is read.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a document's source is read.
    ///
    /// # Arguments
    /// * `index` — 1-based position of the source in the batch
    /// * `total` — number of sources in the batch
    fn on_document_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a document converts successfully.
    ///
    /// `markup_len` is the byte length of the produced markup.
    fn on_document_complete(&self, index: usize, total: usize, markup_len: usize) {
        let _ = (index, total, markup_len);
    }

    /// Called when a document's source could not be read.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
