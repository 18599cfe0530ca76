//! # chatmark
//!
//! Convert the rich-text HTML of a calendar event description into the
//! lightweight markup a team-chat message body understands.
//!
//! Calendar APIs hand back descriptions as HTML (`<b>`, `<br>`, `<ul>`,
//! `<a href>`, entities). Chat platforms render a different dialect:
//! `*bold*`, `_italic_`, `~strike~`, and `<url|label>` links. This crate
//! bridges the two with a fixed, ordered set of rewrite stages.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML
//!  │
//!  ├─ 1–2   <br>, paragraphs      → newlines, blank lines
//!  ├─ 3     <a href>              → <url|label> (shielded from stage 9)
//!  ├─ 4–6   b/strong, i/em, s/del → * _ ~
//!  ├─ 7–8   lists, headings       → • items, *heading*
//!  ├─ 9–10  strip other tags, unshield links
//!  ├─ 11    decode entities
//!  └─ 12    collapse blank lines, trim
//! ```
//!
//! The converter is a pure function: it never fails, holds no state, and is
//! safe to call from any thread.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = "<p><b>Agenda</b></p><ul><li>Demo</li><li>Q&amp;A</li></ul>";
//! assert_eq!(chatmark::convert(html), "*Agenda*\n\n• Demo\n• Q&A");
//! ```
//!
//! Files and stdin are handled by the async batch API:
//!
//! ```rust,no_run
//! use chatmark::{convert_batch, ConversionConfig, InputSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().bullet("-").build()?;
//!     let sources = vec![InputSource::parse("event.html")];
//!     let output = convert_batch(&sources, &config).await?;
//!     println!("{}", output.markup);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `chatmark` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, DocumentSeparator, MalformedEntityPolicy};
pub use convert::{convert, convert_batch, convert_batch_sync, convert_source, convert_to_file, convert_with};
pub use error::{ChatmarkError, DocumentError};
pub use output::{ConversionOutput, ConversionStats, DocumentResult, MarkupDocument};
pub use pipeline::entities::decode_entities;
pub use pipeline::input::InputSource;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, DocumentStream};
