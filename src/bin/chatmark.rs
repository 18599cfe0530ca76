//! CLI binary for chatmark.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use chatmark::{
    convert_batch, convert_to_file, ConversionConfig, ConversionProgressCallback,
    DocumentSeparator, InputSource, MalformedEntityPolicy, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar for batches of more than one document. Documents
/// finish out of order, so each log line carries its own index.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} documents",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_document_complete(&self, index: usize, total: usize, markup_len: usize) {
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{markup_len:>5} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(error.lines().next().unwrap_or(error)),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a snippet given on the command line
  chatmark --html '<b>Stand-up</b><br>Room <i>4B</i>'

  # Convert a file (stdout)
  chatmark description.html

  # Read from stdin
  curl -s "$CALENDAR_EVENT_URL" | jq -r .description | chatmark

  # Several files into one output, separated by a divider
  chatmark --separator hr mon.html tue.html wed.html -o week.txt

  # JSON with per-document stats
  chatmark --json *.html > out.json

OUTPUT DIALECT:
  <b>, <strong>            *bold*
  <i>, <em>                _italic_
  <s>, <strike>, <del>     ~strike~
  <a href="URL">LABEL</a>  <URL|LABEL>
  <li>                     • item
  <h1>…<h6>                *heading* on its own line
  other tags               removed, text kept
"#;

/// Convert calendar rich-text HTML to chat markup.
#[derive(Parser, Debug)]
#[command(
    name = "chatmark",
    version,
    about = "Convert calendar rich-text HTML to chat markup",
    long_about = "Convert the HTML of a calendar event description into chat-platform markup \
(*bold*, _italic_, ~strike~, <url|label>). Reads files, stdin (`-`), or an inline snippet.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input files; `-` reads stdin. Defaults to stdin when none are given.
    inputs: Vec<String>,

    /// Convert this HTML snippet instead of reading input files.
    #[arg(long, conflicts_with = "inputs")]
    html: Option<String>,

    /// Write markup to this file instead of stdout.
    #[arg(short, long, env = "CHATMARK_OUTPUT")]
    output: Option<PathBuf>,

    /// Glyph placed before each list item.
    #[arg(long, env = "CHATMARK_BULLET", default_value = "•")]
    bullet: String,

    /// Handling of malformed numeric entities such as `&#12a;`.
    #[arg(long, env = "CHATMARK_MALFORMED_ENTITIES", value_enum, default_value = "keep")]
    malformed_entities: EntityArg,

    /// Document separator: none, blank, hr, or a custom string.
    #[arg(long, env = "CHATMARK_SEPARATOR", default_value = "blank")]
    separator: String,

    /// Number of inputs read concurrently.
    #[arg(short, long, env = "CHATMARK_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Largest accepted input, in bytes.
    #[arg(long, env = "CHATMARK_MAX_INPUT_BYTES", default_value_t = 4 * 1024 * 1024)]
    max_input_bytes: u64,

    /// Output structured JSON (ConversionOutput) instead of markup.
    #[arg(long, env = "CHATMARK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CHATMARK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CHATMARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CHATMARK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EntityArg {
    Keep,
    Drop,
    Replace,
}

impl From<EntityArg> for MalformedEntityPolicy {
    fn from(v: EntityArg) -> Self {
        match v {
            EntityArg::Keep => MalformedEntityPolicy::Keep,
            EntityArg::Drop => MalformedEntityPolicy::Drop,
            EntityArg::Replace => MalformedEntityPolicy::Replace,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let sources = collect_sources(&cli);
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && sources.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = convert_to_file(&sources, output_path, &config)
            .await
            .context("Conversion failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} documents  {}ms  →  {}",
                if stats.failed_documents == 0 {
                    green("✔")
                } else {
                    red("⚠")
                },
                stats.converted_documents,
                stats.total_documents,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = convert_batch(&sources, &config)
            .await
            .context("Conversion failed")?;

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        } else {
            writeln!(handle, "{}", output.markup).context("Failed to write to stdout")?;
        }

        if !cli.quiet && output.stats.failed_documents > 0 {
            eprintln!(
                "{} {}/{} documents failed",
                red("⚠"),
                output.stats.failed_documents,
                output.stats.total_documents
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .bullet(cli.bullet.clone())
        .malformed_entities(cli.malformed_entities.clone().into())
        .document_separator(parse_separator(&cli.separator))
        .concurrency(cli.concurrency)
        .max_input_bytes(cli.max_input_bytes);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Inline snippet, the listed inputs, or stdin when nothing was given.
fn collect_sources(cli: &Cli) -> Vec<InputSource> {
    if let Some(ref html) = cli.html {
        return vec![InputSource::Inline(html.clone())];
    }
    if cli.inputs.is_empty() {
        return vec![InputSource::Stdin];
    }
    cli.inputs.iter().map(|s| InputSource::parse(s)).collect()
}

/// Parse `--separator` string into `DocumentSeparator`.
fn parse_separator(s: &str) -> DocumentSeparator {
    match s.to_lowercase().as_str() {
        "none" => DocumentSeparator::None,
        "blank" => DocumentSeparator::BlankLine,
        "hr" | "---" => DocumentSeparator::HorizontalRule,
        _ => DocumentSeparator::Custom(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_keywords() {
        assert!(matches!(parse_separator("HR"), DocumentSeparator::HorizontalRule));
        assert!(matches!(parse_separator("blank"), DocumentSeparator::BlankLine));
        assert!(matches!(parse_separator("none"), DocumentSeparator::None));
        assert!(matches!(
            parse_separator("=== Next ==="),
            DocumentSeparator::Custom(ref s) if s == "=== Next ==="
        ));
    }

    #[test]
    fn sources_default_to_stdin() {
        let cli = Cli::parse_from(["chatmark"]);
        assert_eq!(collect_sources(&cli), vec![InputSource::Stdin]);
    }

    #[test]
    fn html_flag_is_inline_source() {
        let cli = Cli::parse_from(["chatmark", "--html", "<b>x</b>"]);
        assert_eq!(
            collect_sources(&cli),
            vec![InputSource::Inline("<b>x</b>".into())]
        );
    }

    #[test]
    fn config_from_flags() {
        let cli = Cli::parse_from([
            "chatmark",
            "--bullet",
            "-",
            "--malformed-entities",
            "replace",
            "a.html",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.bullet, "-");
        assert_eq!(config.malformed_entities, MalformedEntityPolicy::Replace);
    }
}
