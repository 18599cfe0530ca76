//! Error types for the chatmark library.
//!
//! The markup converter itself is total: [`crate::convert()`] returns a
//! `String` for every input and has no error path. Errors only arise around
//! it, when sources are read from disk or stdin and results written back.
//!
//! * [`ChatmarkError`] — **Fatal**: the request cannot proceed at all
//!   (bad configuration, unwritable output, every document failed).
//!
//! * [`DocumentError`] — **Non-fatal**: one source in a batch could not be
//!   read. Stored inside [`crate::output::DocumentResult`] so the other
//!   documents still convert.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the chatmark library.
#[derive(Debug, Error)]
pub enum ChatmarkError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The source is larger than `max_input_bytes`.
    #[error("Input '{source_name}' is {size} bytes, over the {limit}-byte limit")]
    InputTooLarge {
        source_name: String,
        size: u64,
        limit: u64,
    },

    /// The source bytes are not valid UTF-8.
    #[error("Input '{source_name}' is not valid UTF-8 (first bad byte at offset {offset})")]
    NotUtf8 { source_name: String, offset: usize },

    /// Reading the source failed for another I/O reason.
    #[error("Failed to read '{source_name}': {source}")]
    ReadFailed {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// A batch was requested with no sources.
    #[error("No input given")]
    NoInput,

    // ── Batch errors ──────────────────────────────────────────────────────
    /// Every document in the batch failed; output would be empty.
    #[error("All {total} documents failed.\nFirst error: {first_error}")]
    AllDocumentsFailed { total: usize, first_error: String },

    /// Some documents succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::ConversionOutput::into_result`] when
    /// the caller wants to treat any document failure as an error.
    #[error("{failed}/{total} documents failed during conversion")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document in a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The source could not be read.
    #[error("Document {index} ({source_name}): {detail}")]
    ReadFailed {
        index: usize,
        source_name: String,
        detail: String,
    },
}

impl DocumentError {
    /// Wrap a fatal read error as a per-document failure.
    pub fn from_read(index: usize, source_name: impl Into<String>, err: &ChatmarkError) -> Self {
        DocumentError::ReadFailed {
            index,
            source_name: source_name.into(),
            detail: err.to_string(),
        }
    }
}
