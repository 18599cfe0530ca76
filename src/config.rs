//! Configuration types for HTML-to-chat-markup conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The markup pipeline itself only reads
//! [`ConversionConfig::bullet`] and [`ConversionConfig::malformed_entities`];
//! the remaining fields steer batch conversion of files and stdin.

use crate::error::ChatmarkError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use chatmark::{ConversionConfig, MalformedEntityPolicy};
///
/// let config = ConversionConfig::builder()
///     .bullet("-")
///     .malformed_entities(MalformedEntityPolicy::Drop)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Glyph placed before each list item. Default: `•`.
    ///
    /// Must be non-empty and single-line; a newline would split every list
    /// item across two lines of the chat message.
    pub bullet: String,

    /// What to do with `&#…;` references that are not valid numbers.
    /// Default: [`MalformedEntityPolicy::Keep`].
    pub malformed_entities: MalformedEntityPolicy,

    /// Number of sources read and converted at once in a batch. Default: 8.
    pub concurrency: usize,

    /// Separator between documents in assembled batch output.
    /// Default: [`DocumentSeparator::BlankLine`].
    pub document_separator: DocumentSeparator,

    /// Largest file or stdin input accepted, in bytes. Default: 4 MiB.
    ///
    /// Calendar descriptions are small; anything far larger is almost
    /// certainly the wrong file.
    pub max_input_bytes: u64,

    /// Optional per-document progress events for batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            bullet: DEFAULT_BULLET.to_string(),
            malformed_entities: MalformedEntityPolicy::default(),
            concurrency: 8,
            document_separator: DocumentSeparator::default(),
            max_input_bytes: 4 * 1024 * 1024,
            progress_callback: None,
        }
    }
}

/// Bullet used for list items unless configured otherwise.
pub const DEFAULT_BULLET: &str = "\u{2022}";

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("bullet", &self.bullet)
            .field("malformed_entities", &self.malformed_entities)
            .field("concurrency", &self.concurrency)
            .field("document_separator", &self.document_separator)
            .field("max_input_bytes", &self.max_input_bytes)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn bullet(mut self, bullet: impl Into<String>) -> Self {
        self.config.bullet = bullet.into();
        self
    }

    pub fn malformed_entities(mut self, policy: MalformedEntityPolicy) -> Self {
        self.config.malformed_entities = policy;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn document_separator(mut self, sep: DocumentSeparator) -> Self {
        self.config.document_separator = sep;
        self
    }

    pub fn max_input_bytes(mut self, n: u64) -> Self {
        self.config.max_input_bytes = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ChatmarkError> {
        let c = &self.config;
        if c.bullet.trim().is_empty() {
            return Err(ChatmarkError::InvalidConfig(
                "Bullet must contain a visible character".into(),
            ));
        }
        if c.bullet.contains(['\n', '\r']) {
            return Err(ChatmarkError::InvalidConfig(format!(
                "Bullet must be a single line, got {:?}",
                c.bullet
            )));
        }
        if c.concurrency == 0 {
            return Err(ChatmarkError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.max_input_bytes == 0 {
            return Err(ChatmarkError::InvalidConfig(
                "Maximum input size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Handling of numeric entities such as `&#12a;` or `&#xZZ;` whose body
/// does not parse in the expected radix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedEntityPolicy {
    /// Leave the reference text unchanged. (default)
    #[default]
    Keep,
    /// Remove the reference.
    Drop,
    /// Substitute U+FFFD REPLACEMENT CHARACTER.
    Replace,
}

/// How to separate documents in assembled batch output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum DocumentSeparator {
    /// Single newline between documents.
    None,
    /// Blank line: "\n\n". (default)
    #[default]
    BlankLine,
    /// Horizontal divider line: "\n\n---\n\n"
    HorizontalRule,
    /// Custom string inserted between documents on its own line.
    Custom(String),
}

impl DocumentSeparator {
    /// Render the separator string placed before the next document.
    pub fn render(&self) -> String {
        match self {
            DocumentSeparator::None => "\n".to_string(),
            DocumentSeparator::BlankLine => "\n\n".to_string(),
            DocumentSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            DocumentSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}
