//! The markup pipeline: HTML snippet in, chat markup out.
//!
//! ## Rule Order
//!
//! Tag rewriting runs first and ends with a generic strip of every leftover
//! tag, so anything the earlier stages did not recognise disappears while its
//! text survives. Entity decoding comes after stripping so that a decoded
//! `&lt;b&gt;` stays literal text rather than being read as a tag. Whitespace
//! is normalised last, once every stage that inserts newlines has run.

use crate::config::MalformedEntityPolicy;
use crate::pipeline::{entities, tags};
use once_cell::sync::Lazy;
use regex::Regex;

/// Convert an HTML snippet to chat markup.
///
/// Never fails; input that is not valid HTML still yields a best-effort
/// string. Empty input is returned unchanged.
///
/// Stages (applied in order):
/// 1. `<br>` variants → newline
/// 2. Paragraph boundaries → blank line
/// 3. Anchors → protected `<url|label>`
/// 4. Bold → `*`
/// 5. Italic → `_`
/// 6. Strikethrough → `~`
/// 7. List items → bulleted lines
/// 8. Headings → bold line
/// 9. Strip every remaining tag
/// 10. Restore protected link brackets
/// 11. Decode entities
/// 12. Collapse 3+ newlines to 2 and trim
pub fn html_to_markup(input: &str, bullet: &str, policy: MalformedEntityPolicy) -> String {
    if input.is_empty() {
        return String::new();
    }
    let s = tags::scrub_sentinels(input);
    let s = tags::rewrite_line_breaks(&s);
    let s = tags::rewrite_paragraphs(&s);
    let s = tags::rewrite_links(&s);
    let s = tags::rewrite_bold(&s);
    let s = tags::rewrite_italic(&s);
    let s = tags::rewrite_strikethrough(&s);
    let s = tags::rewrite_lists(&s, bullet);
    let s = tags::rewrite_headings(&s);
    let s = tags::strip_tags(&s);
    let s = tags::restore_links(&s);
    let s = entities::decode_entities(&s, policy);
    normalise_whitespace(&s)
}

// ── Stage 12: Whitespace ─────────────────────────────────────────────────────

static RE_NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn normalise_whitespace(input: &str) -> String {
    RE_NEWLINE_RUN
        .replace_all(input, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(s: &str) -> String {
        html_to_markup(s, "•", MalformedEntityPolicy::Keep)
    }

    #[test]
    fn test_empty_and_plain() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("plain text"), "plain text");
    }

    #[test]
    fn test_inline_styles() {
        assert_eq!(convert("<i>a</i>"), "_a_");
        assert_eq!(convert("<b>a</b>"), "*a*");
        assert_eq!(convert("<s>a</s>"), "~a~");
    }

    #[test]
    fn test_breaks() {
        assert_eq!(convert("a<br>b"), "a\nb");
        assert_eq!(convert("a<br/>b<br />c"), "a\nb\nc");
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(convert("<p>One</p><p>Two</p>"), "One\n\nTwo");
        assert_eq!(convert("<p>Only</p>"), "Only");
        assert_eq!(convert("<p>One</p>Tail"), "One\n\nTail");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert(r#"<a href="https://x.com">L</a>"#),
            "<https://x.com|L>"
        );
        assert_eq!(
            convert(r#"<a href="https://x.com" target="_blank">L</a>"#),
            "<https://x.com|L>"
        );
    }

    #[test]
    fn test_link_label_keeps_inline_markup() {
        assert_eq!(
            convert(r#"<a href="u"><b>bold</b> <span>plain</span></a>"#),
            "<u|*bold* plain>"
        );
    }

    #[test]
    fn test_list_lines() {
        let out = convert("<ul><li>A</li><li>B</li>");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.contains(&"• A"), "got: {out:?}");
        assert!(lines.contains(&"• B"), "got: {out:?}");
    }

    #[test]
    fn test_heading() {
        assert_eq!(convert("<h1>Title</h1>Body"), "*Title*\nBody");
    }

    #[test]
    fn test_entities_after_strip() {
        assert_eq!(convert("&amp;"), "&");
        assert_eq!(convert("&#65;"), "A");
        assert_eq!(convert("&#x41;"), "A");
        assert_eq!(convert("&lt;b&gt;not bold&lt;/b&gt;"), "<b>not bold</b>");
    }

    #[test]
    fn test_unknown_tags_stripped() {
        assert_eq!(convert(r#"<span class="x">t</span>"#), "t");
        assert_eq!(convert("<div><table><tr><td>cell</td></tr></table></div>"), "cell");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(convert("a<br><br><br><br>b"), "a\n\nb");
        assert_eq!(convert("  \n<p> x </p>\n\n"), "x");
    }

    #[test]
    fn test_sentinels_in_input_are_not_brackets() {
        assert_eq!(convert("a\u{E000}b\u{E001}c"), "abc");
    }

    #[test]
    fn test_second_pass_is_noop() {
        let once = convert("<p><b>Stand-up</b> &amp; <i>retro</i></p><ul><li>Notes</li></ul>");
        assert!(!once.contains('<'));
        assert_eq!(convert(&once), once);
    }

    #[test]
    fn test_composite_description() {
        let html = "<b>Agenda</b><br><ul><li>Item1</li></ul>\
                    <p>Contact <a href=\"mailto:x@y.com\">lead</a>.</p>";
        let out = convert(html);
        assert!(out.contains("*Agenda*"), "got: {out:?}");
        assert!(out.lines().any(|l| l == "• Item1"), "got: {out:?}");
        assert!(out.contains("<mailto:x@y.com|lead>"), "got: {out:?}");
    }

    #[test]
    fn test_custom_bullet() {
        let out = html_to_markup("<ol><li>x</li></ol>", "-", MalformedEntityPolicy::Keep);
        assert_eq!(out, "- x");
    }
}
