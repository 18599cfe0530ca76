//! Tag rewriting: stages 1–10 of the markup pipeline.
//!
//! Every stage is a pure `&str → String` pass backed by one precompiled
//! regex. The order is significant:
//!
//! - Links run before the inline styles so a label such as
//!   `<a href="…"><b>x</b></a>` still has its bold converted afterwards.
//! - Links are wrapped in private-use sentinels rather than `<`/`>` because
//!   [`strip_tags`] deletes anything shaped like a tag. [`restore_links`]
//!   turns the sentinels back into brackets once stripping is done.
//! - Lists run before [`strip_tags`], so tags nested inside `<li>` are
//!   removed later and nested lists come out flattened.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Opening bracket of a protected `<url|label>` span.
pub(crate) const LINK_OPEN: char = '\u{E000}';
/// Closing bracket of a protected `<url|label>` span.
pub(crate) const LINK_CLOSE: char = '\u{E001}';

// ── Sentinel scrub ───────────────────────────────────────────────────────────

/// Remove any sentinel code points already present in the input so they can
/// never be restored into brackets that were not produced by [`rewrite_links`].
pub(crate) fn scrub_sentinels(input: &str) -> String {
    input.replace([LINK_OPEN, LINK_CLOSE], "")
}

// ── Stage 1: Line breaks ─────────────────────────────────────────────────────

static RE_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());

pub(crate) fn rewrite_line_breaks(input: &str) -> String {
    RE_BR.replace_all(input, "\n").into_owned()
}

// ── Stage 2: Paragraphs ──────────────────────────────────────────────────────

static RE_P_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</p\s*>\s*<p(?:\s[^>]*)?>").unwrap());
static RE_P_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").unwrap());
static RE_P_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p\s*>").unwrap());

pub(crate) fn rewrite_paragraphs(input: &str) -> String {
    let s = RE_P_BOUNDARY.replace_all(input, "\n\n");
    let s = RE_P_OPEN.replace_all(&s, "");
    RE_P_CLOSE.replace_all(&s, "\n\n").into_owned()
}

// ── Stage 3: Links ───────────────────────────────────────────────────────────

// `href` must follow whitespace so `data-href` is not mistaken for it.
static RE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#,
    )
    .unwrap()
});

pub(crate) fn rewrite_links(input: &str) -> String {
    RE_LINK
        .replace_all(input, |caps: &Captures<'_>| {
            let url = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            format!("{LINK_OPEN}{url}|{}{LINK_CLOSE}", &caps[3])
        })
        .into_owned()
}

// ── Stages 4–6: Inline styles ────────────────────────────────────────────────

static RE_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:b|strong)(?:\s[^>]*)?>|</(?:b|strong)\s*>").unwrap());
static RE_ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:i|em)(?:\s[^>]*)?>|</(?:i|em)\s*>").unwrap());
static RE_STRIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:s|strike|del)(?:\s[^>]*)?>|</(?:s|strike|del)\s*>").unwrap()
});

pub(crate) fn rewrite_bold(input: &str) -> String {
    RE_BOLD.replace_all(input, "*").into_owned()
}

pub(crate) fn rewrite_italic(input: &str) -> String {
    RE_ITALIC.replace_all(input, "_").into_owned()
}

pub(crate) fn rewrite_strikethrough(input: &str) -> String {
    RE_STRIKE.replace_all(input, "~").into_owned()
}

// ── Stage 7: Lists ───────────────────────────────────────────────────────────

static RE_LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li(?:\s[^>]*)?>(.*?)</li\s*>").unwrap());
static RE_LIST_WRAPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:ul|ol)(?:\s[^>]*)?>").unwrap());

pub(crate) fn rewrite_lists(input: &str, bullet: &str) -> String {
    let s = RE_LIST_ITEM.replace_all(input, |caps: &Captures<'_>| {
        format!("\n{bullet} {}", caps[1].trim())
    });
    RE_LIST_WRAPPER.replace_all(&s, "\n").into_owned()
}

// ── Stage 8: Headings ────────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h[1-6](?:\s[^>]*)?>(.*?)</h[1-6]\s*>").unwrap());

pub(crate) fn rewrite_headings(input: &str) -> String {
    RE_HEADING
        .replace_all(input, |caps: &Captures<'_>| {
            format!("\n*{}*\n", caps[1].trim())
        })
        .into_owned()
}

// ── Stage 9: Strip remaining tags ────────────────────────────────────────────

static RE_ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

pub(crate) fn strip_tags(input: &str) -> String {
    RE_ANY_TAG.replace_all(input, "").into_owned()
}

// ── Stage 10: Restore protected links ────────────────────────────────────────

pub(crate) fn restore_links(input: &str) -> String {
    input.replace(LINK_OPEN, "<").replace(LINK_CLOSE, ">")
}
