//! CLI binary for md2ssml.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2ssml::{
    ConversionConfig, ConversionOutput, ConversionProgressCallback, Converter, ProgressCallback,
};
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

/// Terminal progress callback: one bar tick per paragraph.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// The bar length is set by `on_conversion_start`, once the document
    /// has been filtered into paragraphs.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading dictionary…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} paragraphs  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_paragraphs: usize) {
        self.activate_bar(total_paragraphs);
    }

    fn on_paragraph_start(&self, index: usize, _total: usize) {
        self.bar.set_message(format!("paragraph {index}"));
    }

    fn on_paragraph_complete(&self, _index: usize, _total: usize, _fragments: usize) {
        self.bar.inc(1);
    }

    fn on_paragraph_error(&self, index: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Paragraph {:>4}/{:<4}  {}",
            red("✗"),
            index,
            total,
            red(error),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, total_paragraphs: usize, total_fragments: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} paragraphs → {} fragments",
            green("✔"),
            bold(&total_paragraphs.to_string()),
            bold(&total_fragments.to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (stdout)
  md2ssml chapter.md --dictionary /usr/share/hunspell/cs_CZ.dic

  # Convert to file
  md2ssml chapter.md -o chapter.ssml

  # Offline: no Wikipedia lookup, no autocorrection
  md2ssml --no-names --no-autocorrect chapter.md

  # Check an existing SSML file against the synthesis limit
  md2ssml chapter.ssml

  # JSON output with per-paragraph results and stats
  md2ssml --json chapter.md > chapter.json

OUTPUT:
  One SSML fragment per line. Each line is one synthesis request and is
  guaranteed to be at most 5000 characters; a longer line aborts the run.

ENVIRONMENT VARIABLES:
  MD2SSML_DICTIONARY   Word list or hunspell .dic (with .aff beside it)
  MD2SSML_LANGUAGE     Wikipedia language for name expansion (default: cs)
  RUST_LOG             Log filter, overrides --verbose / --quiet
"#;

/// Convert markdown to speech-synthesis markup.
#[derive(Parser, Debug)]
#[command(
    name = "md2ssml",
    version,
    about = "Convert markdown to speech-synthesis markup (SSML)",
    long_about = "Convert loosely structured markdown into SSML: normalise wrapping and \
headings, expand abbreviated names, decode roman numerals, spell out arrows, fix typos \
against a spelling dictionary, tag ordinals, and pack sentences into request-sized chunks.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown (.md, .markdown, .txt) or SSML (.ssml) input file.
    input: PathBuf,

    /// Write SSML to this file instead of stdout.
    #[arg(short, long, env = "MD2SSML_OUTPUT")]
    output: Option<PathBuf>,

    /// Word list or hunspell .dic file for autocorrection (.aff read from beside it).
    #[arg(long, env = "MD2SSML_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Do not expand abbreviated names.
    #[arg(long, env = "MD2SSML_NO_NAMES")]
    no_names: bool,

    /// Do not decode roman numerals.
    #[arg(long, env = "MD2SSML_NO_ROMAN")]
    no_roman: bool,

    /// Do not spell out arrows.
    #[arg(long, env = "MD2SSML_NO_ARROWS")]
    no_arrows: bool,

    /// Do not autocorrect against the dictionary.
    #[arg(long, env = "MD2SSML_NO_AUTOCORRECT")]
    no_autocorrect: bool,

    /// Do not tag ordinal numbers.
    #[arg(long, env = "MD2SSML_NO_ORDINALS")]
    no_ordinals: bool,

    /// Soft character budget per <p> chunk.
    #[arg(long, env = "MD2SSML_CHUNK_BUDGET", default_value_t = 4000,
          value_parser = clap::value_parser!(u64).range(1..5000))]
    chunk_budget: u64,

    /// Wikipedia language used for name expansion.
    #[arg(long, env = "MD2SSML_LANGUAGE", default_value = "cs")]
    language: String,

    /// Preprocess sentences in parallel.
    #[arg(long, env = "MD2SSML_PARALLEL")]
    parallel: bool,

    /// Output structured JSON (ConversionOutput) instead of SSML.
    #[arg(long, env = "MD2SSML_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2SSML_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2SSML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2SSML_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Warnings (uncorrected words, failed lookups) stay visible under the
    // progress bar; INFO is only shown without it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    // The converter owns a blocking HTTP client for name lookups, so it is
    // created, used and dropped on the blocking pool.
    let input = cli.input.clone();
    let output_path = cli.output.clone();
    let output: ConversionOutput = tokio::task::spawn_blocking(move || {
        let converter = Converter::new(config)?;
        match output_path {
            Some(ref path) => converter.convert_to_file(&input, path),
            None => converter.convert_file(&input),
        }
    })
    .await
    .context("Conversion task panicked")?
    .context("Conversion failed")?;

    if let Some(ref output_path) = cli.output {
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        }
        if !cli.quiet {
            eprintln!(
                "{}  {} chunks  {}ms  →  {}",
                green("✔"),
                output.stats.chunks,
                output.stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.ssml.as_bytes())
            .context("Failed to write to stdout")?;
    }

    // Summary (the callback already printed its own when active).
    if !cli.quiet && !show_progress && cli.output.is_none() && !cli.json {
        eprintln!(
            "Converted {} paragraphs ({} sentences, {} chunks) in {}ms",
            output.stats.paragraphs,
            output.stats.sentences,
            output.stats.chunks,
            output.stats.duration_ms
        );
        eprintln!(
            "   longest fragment: {}",
            dim(&format!("{} chars", output.stats.longest_fragment_chars))
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .names(!cli.no_names)
        .roman(!cli.no_roman)
        .arrows(!cli.no_arrows)
        .autocorrect(!cli.no_autocorrect)
        .ordinals(!cli.no_ordinals)
        .chunk_budget(cli.chunk_budget as usize)
        .language(cli.language.clone())
        .parallel(cli.parallel);

    if let Some(ref path) = cli.dictionary {
        builder = builder.dictionary_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
