//! Result types returned by conversion.

use crate::config::ConversionConfig;
use crate::error::{ChatmarkError, DocumentError};
use crate::pipeline::markup;
use serde::{Deserialize, Serialize};

/// One HTML snippet and the chat markup derived from it.
///
/// Has no identity beyond the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupDocument {
    /// The HTML as supplied.
    pub source: String,
    /// The converted chat markup.
    pub markup: String,
}

impl MarkupDocument {
    /// Convert `source` with the given configuration.
    pub fn convert(source: impl Into<String>, config: &ConversionConfig) -> Self {
        let source = source.into();
        let markup =
            markup::html_to_markup(&source, &config.bullet, config.malformed_entities);
        Self { source, markup }
    }
}

/// Outcome for a single source in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// 1-based position of the source in the batch.
    pub index: usize,
    /// Label of the source (path, `<stdin>`, `<inline>`).
    pub source: String,
    /// Converted markup; empty when `error` is set.
    pub markup: String,
    /// Bytes of HTML read.
    pub input_bytes: usize,
    /// Bytes of markup produced.
    pub output_bytes: usize,
    /// Wall-clock time spent reading and converting.
    pub duration_ms: u64,
    /// Set when the source could not be read.
    pub error: Option<DocumentError>,
}

/// Aggregate statistics for a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_documents: usize,
    pub converted_documents: usize,
    pub failed_documents: usize,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub total_duration_ms: u64,
}

/// Everything a batch conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Markup of every successful document, joined by the configured separator.
    pub markup: String,
    /// Per-document results, in input order.
    pub documents: Vec<DocumentResult>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Treat any failed document as an error.
    pub fn into_result(self) -> Result<Self, ChatmarkError> {
        if self.stats.failed_documents > 0 {
            return Err(ChatmarkError::PartialFailure {
                success: self.stats.converted_documents,
                failed: self.stats.failed_documents,
                total: self.stats.total_documents,
            });
        }
        Ok(self)
    }
}
