//! Input resolution: turn a user-supplied source into HTML text.
//!
//! Sources are validated before anything is read: a missing file, a file the
//! process may not open, or a file over `max_input_bytes` is reported with a
//! specific error rather than surfacing as a generic I/O failure halfway
//! through a batch. Text must be UTF-8; calendar APIs return JSON strings, so
//! anything else is the wrong file.

use crate::error::ChatmarkError;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Where a document's HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// HTML passed directly as a string.
    Inline(String),
    /// HTML read from a local file.
    File(PathBuf),
    /// HTML read from standard input.
    Stdin,
}

impl InputSource {
    /// Interpret a CLI argument: `-` means stdin, anything else is a path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    /// Short human-readable label used in results and error messages.
    pub fn label(&self) -> String {
        match self {
            InputSource::Inline(_) => "<inline>".to_string(),
            InputSource::File(p) => p.display().to_string(),
            InputSource::Stdin => "<stdin>".to_string(),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Read a source to a string, enforcing the size limit.
pub async fn read_source(source: &InputSource, max_bytes: u64) -> Result<String, ChatmarkError> {
    match source {
        InputSource::Inline(html) => {
            check_size(source, html.len() as u64, max_bytes)?;
            Ok(html.clone())
        }
        InputSource::File(path) => {
            let len = check_local(path).await?;
            check_size(source, len, max_bytes)?;
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| map_read_error(path, e))?;
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            into_utf8(source, bytes)
        }
        InputSource::Stdin => {
            let mut bytes = Vec::new();
            // Read one byte past the limit so an oversized stream is detected
            // without buffering all of it.
            tokio::io::stdin()
                .take(max_bytes.saturating_add(1))
                .read_to_end(&mut bytes)
                .await
                .map_err(|e| ChatmarkError::ReadFailed {
                    source_name: source.label(),
                    source: e,
                })?;
            check_size(source, bytes.len() as u64, max_bytes)?;
            into_utf8(source, bytes)
        }
    }
}

/// Validate that a local path exists and can be opened; return its size.
async fn check_local(path: &Path) -> Result<u64, ChatmarkError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| map_read_error(path, e))?;
    if !meta.is_file() {
        return Err(ChatmarkError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    // Check read permission by attempting to open
    tokio::fs::File::open(path)
        .await
        .map_err(|e| map_read_error(path, e))?;
    Ok(meta.len())
}

fn map_read_error(path: &Path, e: std::io::Error) -> ChatmarkError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ChatmarkError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ChatmarkError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ChatmarkError::ReadFailed {
            source_name: path.display().to_string(),
            source: e,
        },
    }
}

fn check_size(source: &InputSource, size: u64, limit: u64) -> Result<(), ChatmarkError> {
    if size > limit {
        return Err(ChatmarkError::InputTooLarge {
            source_name: source.label(),
            size,
            limit,
        });
    }
    Ok(())
}

fn into_utf8(source: &InputSource, bytes: Vec<u8>) -> Result<String, ChatmarkError> {
    String::from_utf8(bytes).map_err(|e| ChatmarkError::NotUtf8 {
        source_name: source.label(),
        offset: e.utf8_error().valid_up_to(),
    })
}
