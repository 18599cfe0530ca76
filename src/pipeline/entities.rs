//! Entity decoding: stage 11 of the markup pipeline.
//!
//! Runs after tag stripping, so entities that only appeared inside attribute
//! values are already gone. Decoding is a single regex pass: the output of one
//! replacement is never rescanned, which keeps `&amp;lt;` as the literal text
//! `&lt;` instead of collapsing it to `<`.
//!
//! Numeric references decode to one UTF-16 code unit. The value is reduced
//! modulo 2^16 while the digits are read, so `&#65601;` is `A` (0x10041 keeps
//! only 0x0041) and very long digit strings cannot overflow. Adjacent
//! references forming a UTF-16 surrogate pair combine into one character.

use crate::config::MalformedEntityPolicy;
use once_cell::sync::Lazy;
use regex::Regex;

/// Named entities recognised by the converter.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("nbsp", " "),
    ("quot", "\""),
    ("apos", "'"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("hellip", "\u{2026}"),
    ("laquo", "\u{00AB}"),
    ("raquo", "\u{00BB}"),
    ("bull", "\u{2022}"),
    ("copy", "\u{00A9}"),
    ("reg", "\u{00AE}"),
    ("trade", "\u{2122}"),
];

// Group 1: numeric body after `&#`. Group 2: entity name.
static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#([^;&<>\s]{0,32})|([A-Za-z][A-Za-z0-9]{1,15}));").unwrap());

/// Decode HTML entities in `input`.
///
/// Unknown named entities are left untouched. Numeric references whose body
/// does not parse in the expected radix are handled according to `policy`.
/// A high-surrogate reference immediately followed by a low-surrogate one
/// decodes to the combined character; unpaired surrogates and `&#0;` become
/// U+FFFD.
pub fn decode_entities(input: &str, policy: MalformedEntityPolicy) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    // High surrogate waiting for a low surrogate in the very next reference.
    let mut pending: Option<u16> = None;

    for caps in RE_ENTITY.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            flush_pending(&mut out, &mut pending);
            out.push_str(&input[last..whole.start()]);
        }
        last = whole.end();

        if let Some(body) = caps.get(1) {
            match decode_numeric(body.as_str()) {
                Some(unit) => push_unit(&mut out, &mut pending, unit),
                None => {
                    flush_pending(&mut out, &mut pending);
                    match policy {
                        MalformedEntityPolicy::Keep => out.push_str(whole.as_str()),
                        MalformedEntityPolicy::Drop => {}
                        MalformedEntityPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
                    }
                }
            }
        } else {
            flush_pending(&mut out, &mut pending);
            out.push_str(lookup_named(&caps[2]).unwrap_or(whole.as_str()));
        }
    }

    flush_pending(&mut out, &mut pending);
    out.push_str(&input[last..]);
    out
}

fn lookup_named(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

/// Append one decoded code unit, pairing it with a pending high surrogate
/// when it completes one.
fn push_unit(out: &mut String, pending: &mut Option<u16>, unit: u16) {
    if let Some(high) = pending.take() {
        let mut pair = char::decode_utf16([high, unit]);
        match pair.next() {
            Some(Ok(c)) => {
                out.push(c);
                return;
            }
            // `high` is unpaired; `unit` still needs handling on its own.
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    if is_high_surrogate(unit) {
        *pending = Some(unit);
    } else if unit == 0 {
        out.push(char::REPLACEMENT_CHARACTER);
    } else {
        for c in char::decode_utf16([unit]) {
            out.push(c.unwrap_or(char::REPLACEMENT_CHARACTER));
        }
    }
}

fn flush_pending(out: &mut String, pending: &mut Option<u16>) {
    if pending.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}

/// Decode the body of a numeric reference (`65` or `x41`) to a single
/// UTF-16 code unit. Returns `None` when the body is not a number.
fn decode_numeric(body: &str) -> Option<u16> {
    let (digits, radix) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() {
        return None;
    }
    let mut unit: u32 = 0;
    for ch in digits.chars() {
        let d = ch.to_digit(radix)?;
        unit = (unit * radix + d) & 0xFFFF;
    }
    u16::try_from(unit).ok()
}
