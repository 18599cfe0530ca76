//! Conversion entry points.
//!
//! [`convert`] and [`convert_with`] are the core: synchronous, pure, and
//! infallible. The remaining functions wrap them for sources that live on
//! disk or stdin, where reading can fail and many documents may be converted
//! in one call. Use [`crate::stream::convert_stream`] instead of
//! [`convert_batch`] to receive documents as they finish.

use crate::config::ConversionConfig;
use crate::error::{ChatmarkError, DocumentError};
use crate::output::{ConversionOutput, ConversionStats, DocumentResult};
use crate::pipeline::input::{self, InputSource};
use crate::pipeline::markup;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert an HTML snippet to chat markup with the default configuration.
///
/// # Example
/// ```rust
/// assert_eq!(chatmark::convert("<b>Agenda</b>"), "*Agenda*");
/// assert_eq!(
///     chatmark::convert(r#"<a href="https://x.com">site</a>"#),
///     "<https://x.com|site>"
/// );
/// ```
pub fn convert(html: &str) -> String {
    markup::html_to_markup(
        html,
        crate::config::DEFAULT_BULLET,
        crate::config::MalformedEntityPolicy::default(),
    )
}

/// Convert an HTML snippet to chat markup with an explicit configuration.
///
/// Only `bullet` and `malformed_entities` affect the result.
pub fn convert_with(html: &str, config: &ConversionConfig) -> String {
    markup::html_to_markup(html, &config.bullet, config.malformed_entities)
}

/// Read one source and convert it.
///
/// # Errors
/// Returns the read error for a missing, unreadable, oversized, or
/// non-UTF-8 source.
pub async fn convert_source(
    source: &InputSource,
    config: &ConversionConfig,
) -> Result<DocumentResult, ChatmarkError> {
    let start = Instant::now();
    let html = input::read_source(source, config.max_input_bytes).await?;
    let markup = convert_with(&html, config);
    Ok(DocumentResult {
        index: 1,
        source: source.label(),
        input_bytes: html.len(),
        output_bytes: markup.len(),
        markup,
        duration_ms: start.elapsed().as_millis() as u64,
        error: None,
    })
}

/// Read and convert many sources concurrently.
///
/// Up to `config.concurrency` sources are read at once. Results are returned
/// in input order regardless of completion order.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some documents failed
/// (check `output.stats.failed_documents` or call
/// [`ConversionOutput::into_result`]).
///
/// # Errors
/// - [`ChatmarkError::NoInput`] when `sources` is empty
/// - [`ChatmarkError::AllDocumentsFailed`] when no document could be read
pub async fn convert_batch(
    sources: &[InputSource],
    config: &ConversionConfig,
) -> Result<ConversionOutput, ChatmarkError> {
    if sources.is_empty() {
        return Err(ChatmarkError::NoInput);
    }
    let total_start = Instant::now();
    let total = sources.len();
    info!("Starting batch conversion of {} documents", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut documents: Vec<DocumentResult> = stream::iter(
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| process_document(i + 1, total, source, config)),
    )
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    documents.sort_by_key(|d| d.index);

    let converted = documents.iter().filter(|d| d.error.is_none()).count();
    let failed = total - converted;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, converted);
    }

    if converted == 0 {
        let first_error = documents
            .iter()
            .find_map(|d| d.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ChatmarkError::AllDocumentsFailed { total, first_error });
    }

    let markup = assemble_documents(&documents, config);

    let stats = ConversionStats {
        total_documents: total,
        converted_documents: converted,
        failed_documents: failed,
        total_input_bytes: documents.iter().map(|d| d.input_bytes as u64).sum(),
        total_output_bytes: documents.iter().map(|d| d.output_bytes as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} documents, {}ms total",
        converted, total, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        markup,
        documents,
        stats,
    })
}

/// Synchronous wrapper around [`convert_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_batch_sync(
    sources: &[InputSource],
    config: &ConversionConfig,
) -> Result<ConversionOutput, ChatmarkError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ChatmarkError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_batch(sources, config))
}

/// Convert a batch and write the assembled markup to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files. The temp
/// file is created with a unique name, so no existing file other than the
/// destination is ever touched.
pub async fn convert_to_file(
    sources: &[InputSource],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ChatmarkError> {
    let output = convert_batch(sources, config).await?;
    let path = output_path.as_ref();
    let write_err = |e: std::io::Error| ChatmarkError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let mut contents = output.markup;
    contents.push('\n');

    // Atomic write: a uniquely named temp file in the target directory,
    // renamed over the destination. A failed rename drops (deletes) it.
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| ChatmarkError::Internal(format!("Output writer task failed: {e}")))?
    .map_err(write_err)?;

    debug!("Wrote {}", path.display());
    Ok(output.stats)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Read and convert one source inside a batch, reporting progress.
///
/// Read failures become a [`DocumentError`] on the result instead of
/// aborting the batch.
pub(crate) async fn process_document(
    index: usize,
    total: usize,
    source: &InputSource,
    config: &ConversionConfig,
) -> DocumentResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(index, total);
    }
    let start = Instant::now();
    let label = source.label();

    let result = match input::read_source(source, config.max_input_bytes).await {
        Ok(html) => {
            let markup = convert_with(&html, config);
            debug!(
                "Document {} ({}): {} → {} bytes",
                index,
                label,
                html.len(),
                markup.len()
            );
            DocumentResult {
                index,
                source: label,
                input_bytes: html.len(),
                output_bytes: markup.len(),
                markup,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            warn!("Document {} ({}) failed: {}", index, label, e);
            let error = DocumentError::from_read(index, label.clone(), &e);
            DocumentResult {
                index,
                source: label,
                markup: String::new(),
                input_bytes: 0,
                output_bytes: 0,
                duration_ms: start.elapsed().as_millis() as u64,
                error: Some(error),
            }
        }
    };

    if let Some(ref cb) = config.progress_callback {
        match &result.error {
            None => cb.on_document_complete(index, total, result.output_bytes),
            Some(e) => cb.on_document_error(index, total, &e.to_string()),
        }
    }
    result
}

/// Join the markup of successful documents with the configured separator.
fn assemble_documents(documents: &[DocumentResult], config: &ConversionConfig) -> String {
    let separator = config.document_separator.render();
    documents
        .iter()
        .filter(|d| d.error.is_none())
        .map(|d| d.markup.as_str())
        .collect::<Vec<_>>()
        .join(&separator)
}
