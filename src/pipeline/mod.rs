//! Pipeline stages for HTML-to-chat-markup conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ tags ──▶ entities ──▶ markup (whitespace + composition)
//! (read)   (1–10)     (11)          (12)
//! ```
//!
//! 1. [`input`]    — resolve an inline string, file, or stdin to UTF-8 text
//! 2. [`tags`]     — rewrite recognised tags, strip the rest; links are
//!    shielded from stripping with private-use sentinels
//! 3. [`entities`] — decode named and numeric entities in one pass
//! 4. [`markup`]   — compose the stages in order and normalise whitespace

pub mod entities;
pub mod input;
pub mod markup;
pub mod tags;
