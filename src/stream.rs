//! Streaming conversion API: emit documents as they complete.
//!
//! Unlike [`crate::convert::convert_batch`], which returns only after every
//! source has been read, [`convert_stream`] yields each document as soon as it
//! is ready. Documents arrive in completion order; sort by `index` if order
//! matters.

use crate::config::ConversionConfig;
use crate::convert::process_document;
use crate::error::DocumentError;
use crate::output::DocumentResult;
use crate::pipeline::input::InputSource;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of document results.
pub type DocumentStream =
    Pin<Box<dyn Stream<Item = Result<DocumentResult, DocumentError>> + Send>>;

/// Convert many sources, streaming each document as it is ready.
///
/// An empty `sources` yields an empty stream. Progress callbacks fire per
/// document but the batch-level start/complete events do not, since the
/// stream may be dropped before it is drained.
///
/// # Example
/// ```rust,no_run
/// use chatmark::{convert_stream, ConversionConfig, InputSource};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() {
/// let sources = vec![InputSource::parse("standup.html"), InputSource::parse("retro.html")];
/// let mut docs = convert_stream(sources, &ConversionConfig::default());
/// while let Some(doc) = docs.next().await {
///     match doc {
///         Ok(d) => println!("{}: {}", d.source, d.markup),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # }
/// ```
pub fn convert_stream(sources: Vec<InputSource>, config: &ConversionConfig) -> DocumentStream {
    let total = sources.len();
    info!("Starting streaming conversion of {} documents", total);

    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(sources.into_iter().enumerate().map(move |(i, source)| {
        let cfg = config.clone();
        async move {
            let mut result = process_document(i + 1, total, &source, &cfg).await;
            match result.error.take() {
                None => Ok(result),
                Some(err) => Err(err),
            }
        }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
