//! Integration tests for chatmark.
//!
//! The first half pins the converter's observable behaviour on realistic
//! calendar descriptions; the second half drives the batch API against real
//! files in a temporary directory.

use chatmark::{
    convert, convert_batch, convert_source, convert_to_file, convert_with, ChatmarkError,
    ConversionConfig, ConversionProgressCallback, DocumentSeparator, InputSource,
    MalformedEntityPolicy,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Assert the markup carries no HTML tag syntax other than `<url|label>` links.
fn assert_no_stray_tags(markup: &str) {
    for (i, _) in markup.match_indices('<') {
        let rest = &markup[i..];
        let end = rest.find('>').expect("unbalanced '<' in output");
        assert!(
            rest[..end].contains('|'),
            "stray tag {:?} in {markup:?}",
            &rest[..=end]
        );
    }
}

// ── Converter behaviour ──────────────────────────────────────────────────────

#[test]
fn test_documented_examples() {
    assert_eq!(convert(""), "");
    assert_eq!(convert("plain text"), "plain text");
    assert_eq!(convert("<i>a</i>"), "_a_");
    assert_eq!(convert("<b>a</b>"), "*a*");
    assert_eq!(convert("<s>a</s>"), "~a~");
    assert_eq!(convert("a<br>b"), "a\nb");
    assert_eq!(convert("a<br/>b<br />c"), "a\nb\nc");
    assert_eq!(convert("<p>One</p><p>Two</p>"), "One\n\nTwo");
    assert_eq!(convert("&amp;"), "&");
    assert_eq!(convert("&#65;"), "A");
    assert_eq!(convert("&#x41;"), "A");
    assert_eq!(convert(r#"<span class="x">t</span>"#), "t");
    assert_eq!(convert("a<br><br><br><br>b"), "a\n\nb");
}

#[test]
fn test_link_forms() {
    assert_eq!(
        convert(r#"<a href="https://x.com">L</a>"#),
        "<https://x.com|L>"
    );
    assert_eq!(
        convert(r#"<a href="https://x.com" target="_blank">L</a>"#),
        "<https://x.com|L>"
    );
    assert_eq!(
        convert(r#"<a target="_blank" rel="noopener" href="https://x.com">L</a>"#),
        "<https://x.com|L>"
    );
}

#[test]
fn test_list_items_are_distinct_lines() {
    let out = convert("<ul><li>A</li><li>B</li>");
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.contains(&"• A"), "got: {out:?}");
    assert!(lines.contains(&"• B"), "got: {out:?}");
}

#[test]
fn test_composite_scenario() {
    let html = "<b>Agenda</b><br><ul><li>Item1</li></ul>\
                <p>Contact <a href=\"mailto:x@y.com\">lead</a>.</p>";
    let out = convert(html);
    assert!(out.contains("*Agenda*"), "got: {out:?}");
    assert!(out.lines().any(|l| l == "• Item1"), "got: {out:?}");
    assert!(out.contains("<mailto:x@y.com|lead>"), "got: {out:?}");
}

#[test]
fn test_realistic_calendar_description() {
    let html = concat!(
        "<h2>Quarterly planning</h2>",
        "<p>Hi team,&nbsp;please review the <a href=\"https://docs.example.org/q3\" ",
        "target=\"_blank\">Q3 doc</a> before we meet.</p>",
        "<p><strong>Bring:</strong></p>",
        "<ol><li>Roadmap <em>draft</em></li><li><del>Budget</del> Headcount</li></ol>",
        "<div><span style=\"color:red\">Room 4B</span> &ndash; 2nd floor</div>",
    );
    let out = convert(html);

    assert!(out.starts_with("*Quarterly planning*"), "got: {out:?}");
    assert!(out.contains("Hi team, please review the <https://docs.example.org/q3|Q3 doc>"));
    assert!(out.contains("*Bring:*"));
    assert!(out.lines().any(|l| l == "• Roadmap _draft_"), "got: {out:?}");
    assert!(out.lines().any(|l| l == "• ~Budget~ Headcount"), "got: {out:?}");
    assert!(out.contains("Room 4B \u{2013} 2nd floor"));
    assert!(!out.contains("\n\n\n"));
    assert_no_stray_tags(&out);
}

#[test]
fn test_uppercase_tags() {
    assert_eq!(convert("<B>x</B><BR><I>y</I>"), "*x*\n_y_");
}

#[test]
fn test_malformed_html_keeps_text() {
    assert_eq!(convert("<div>open <b>bold"), "open *bold");
    assert_eq!(convert("a <unknown attr=1>b</unknown> c"), "a b c");
}

#[test]
fn test_escaped_markup_is_literal() {
    assert_eq!(convert("&lt;b&gt;x&lt;/b&gt;"), "<b>x</b>");
}

#[test]
fn test_malformed_numeric_entity_policies() {
    let html = "x&#12a;y";
    assert_eq!(convert(html), "x&#12a;y");

    let drop = ConversionConfig::builder()
        .malformed_entities(MalformedEntityPolicy::Drop)
        .build()
        .unwrap();
    assert_eq!(convert_with(html, &drop), "xy");

    let replace = ConversionConfig::builder()
        .malformed_entities(MalformedEntityPolicy::Replace)
        .build()
        .unwrap();
    assert_eq!(convert_with(html, &replace), "x\u{FFFD}y");
}

#[test]
fn test_surrogate_pair_entities() {
    assert_eq!(convert("Launch &#xD83D;&#xDE80; today"), "Launch \u{1F680} today");
    assert_eq!(convert("<b>&#55357;&#56832;</b>"), "*\u{1F600}*");
    assert_eq!(convert("lone &#xD83D; here"), "lone \u{FFFD} here");
    assert_eq!(convert("nul&#0;"), "nul\u{FFFD}");
}

#[test]
fn test_idempotent_on_converted_output() {
    let once = convert("<p><b>Sync</b> &mdash; <i>weekly</i></p><ul><li>Notes</li></ul>");
    assert!(!once.contains('<'));
    assert_eq!(convert(&once), once);
}

#[test]
fn test_concurrent_calls() {
    let handles: Vec<_> = (0..8)
        .map(|i| std::thread::spawn(move || convert(&format!("<b>{i}</b>"))))
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        assert_eq!(h.join().unwrap(), format!("*{i}*"));
    }
}

// ── Batch API ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_source_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "event.html", "<p>Hello <b>world</b></p>");
    let doc = convert_source(&InputSource::File(path), &ConversionConfig::default())
        .await
        .unwrap();
    assert_eq!(doc.markup, "Hello *world*");
    assert_eq!(doc.input_bytes, 25);
}

#[tokio::test]
async fn test_convert_source_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "big.html", &"x".repeat(64));
    let config = ConversionConfig::builder()
        .max_input_bytes(16)
        .build()
        .unwrap();
    let err = convert_source(&InputSource::File(path), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, ChatmarkError::InputTooLarge { size: 64, .. }));
}

#[tokio::test]
async fn test_batch_preserves_order_and_counts_failures() {
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<InputSource> = vec![
        InputSource::File(write_file(dir.path(), "a.html", "<b>a</b>")),
        InputSource::File(dir.path().join("missing.html")),
        InputSource::File(write_file(dir.path(), "c.html", "<i>c</i>")),
    ];
    let config = ConversionConfig::builder()
        .concurrency(3)
        .document_separator(DocumentSeparator::HorizontalRule)
        .build()
        .unwrap();

    let output = convert_batch(&sources, &config).await.unwrap();

    let indices: Vec<usize> = output.documents.iter().map(|d| d.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(output.markup, "*a*\n\n---\n\n_c_");
    assert_eq!(output.stats.converted_documents, 2);
    assert_eq!(output.stats.failed_documents, 1);
    assert!(output.documents[1].error.is_some());
    assert!(matches!(
        output.into_result(),
        Err(ChatmarkError::PartialFailure { failed: 1, .. })
    ));
}

#[tokio::test]
async fn test_batch_all_failed() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![InputSource::File(dir.path().join("nope.html"))];
    let err = convert_batch(&sources, &ConversionConfig::default())
        .await
        .unwrap_err();
    match err {
        ChatmarkError::AllDocumentsFailed { total, first_error } => {
            assert_eq!(total, 1);
            assert!(first_error.contains("nope.html"), "got: {first_error}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_batch_progress_events() {
    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
        completed: AtomicUsize,
        failed: AtomicUsize,
        finished_ok: AtomicUsize,
    }

    impl ConversionProgressCallback for Counter {
        fn on_document_start(&self, _index: usize, _total: usize) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_complete(&self, _index: usize, _total: usize, _markup_len: usize) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_error(&self, _index: usize, _total: usize, _error: &str) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_batch_complete(&self, _total: usize, success_count: usize) {
            self.finished_ok.store(success_count, Ordering::SeqCst);
        }
    }

    let counter = Arc::new(Counter::default());
    let config = ConversionConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    let sources = vec![
        InputSource::Inline("<b>x</b>".into()),
        InputSource::File(PathBuf::from("/no/such/file.html")),
    ];

    convert_batch(&sources, &config).await.unwrap();

    assert_eq!(counter.started.load(Ordering::SeqCst), 2);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.finished_ok.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_convert_to_file_writes_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "in.html", "<ul><li>one</li><li>two</li></ul>");
    let out = dir.path().join("nested/out.txt");

    let stats = convert_to_file(&[InputSource::File(input)], &out, &ConversionConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.converted_documents, 1);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "• one\n• two\n");
    let names: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["out.txt"]);
}

#[tokio::test]
async fn test_convert_to_file_leaves_siblings_alone() {
    let dir = tempfile::tempdir().unwrap();
    let notes_tmp = write_file(dir.path(), "notes.tmp", "precious");
    let notes_txt_tmp = write_file(dir.path(), "notes.txt.tmp", "also precious");
    let out = dir.path().join("notes.txt");

    convert_to_file(
        &[InputSource::Inline("<b>saved</b>".into())],
        &out,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "*saved*\n");
    assert_eq!(std::fs::read_to_string(&notes_tmp).unwrap(), "precious");
    assert_eq!(std::fs::read_to_string(&notes_txt_tmp).unwrap(), "also precious");
}

#[tokio::test]
async fn test_convert_to_file_replaces_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = write_file(dir.path(), "out.txt", "stale");

    convert_to_file(
        &[InputSource::Inline("<i>fresh</i>".into())],
        &out,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "_fresh_\n");
}
