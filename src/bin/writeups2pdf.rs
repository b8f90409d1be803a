//! CLI binary for writeups2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConverterConfig` and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use writeups2pdf::{
    convert_directory_with_merge, probe_merge, ConverterConfig, MergeCapability, MergeStatus,
    ProgressCallback, RunProgressCallback, RunSummary,
};

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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: a progress bar anchored at the bottom of the
/// terminal plus one log line per writeup.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-writeup wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` reports how many writeups were found.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Starting browser…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} writeups  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    /// Remove the spinner when the run ends without `on_run_complete`
    /// (nothing found, or a fatal error).
    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_items: usize) {
        self.activate_bar(total_items);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering index and {total_items} writeups…"))
        ));
    }

    fn on_item_start(&self, index: usize, _total: usize, label: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        self.bar.set_message(label.to_string());
    }

    fn on_item_complete(&self, index: usize, total: usize, label: &str) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            label,
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, label: &str, error: &str) {
        let secs = self.elapsed_secs(index);

        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            index,
            total,
            label,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_items: usize, success_count: usize) {
        let failed = total_items.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} writeups rendered successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} writeups rendered  ({} failed)",
                if failed == total_items {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_items,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # A collection of categories
  writeups2pdf ctf-2025/ pdf/

  # A single category directory (its name must be a known category)
  writeups2pdf ctf-2025/forensics pdf/forensics

  # Inside a container running as root
  writeups2pdf --no-sandbox ctf-2025/ pdf/

  # Per-writeup PDFs only, machine-readable summary
  writeups2pdf --no-merge --json ctf-2025/ pdf/ > summary.json

INPUT LAYOUT:
  <collection>/<category>/<challenge>/README.md
  <collection>/<category>/<challenge>/assets/*.png     (optional)

  Known categories: forensics, crypto, web, pwn, reverse, misc, hardware

OUTPUT:
  <OUTPUT_DIR>/_INDEX.pdf                 index of all writeups
  <OUTPUT_DIR>/<category>_<challenge>.pdf one per writeup
  <OUTPUT_DIR>/ALL_WRITEUPS_MERGED.pdf    everything, with separator pages
                                          (only when pdfium is available)

ENVIRONMENT VARIABLES:
  WRITEUPS2PDF_CHROME     Chromium/Chrome executable
  CHROME                  Fallback browser executable
  PDFIUM_LIB_PATH         pdfium shared library (file or directory)
  RUST_LOG                Log filter, overrides --verbose/--quiet

SETUP:
  Rendering needs Chromium or Google Chrome:  apt install chromium
  Merging needs libpdfium (optional); without it the merged PDF is skipped.
"#;

/// Convert a tree of CTF writeups to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "writeups2pdf",
    version,
    about = "Convert a tree of CTF writeups (README.md per challenge) to PDF",
    long_about = "Convert every category/challenge/README.md under INPUT_DIR into its own PDF, \
render an index of all challenges, and merge everything into one PDF with a separator page \
in front of each document. Rendering uses a headless Chromium; merging uses pdfium when it \
is installed.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Collection or single-category directory.
    input_dir: PathBuf,

    /// Where the PDFs are written (created if missing).
    output_dir: PathBuf,

    /// Chromium/Chrome executable. Auto-detected if not set.
    #[arg(long, env = "WRITEUPS2PDF_CHROME")]
    chrome: Option<PathBuf>,

    /// Run Chromium without its sandbox (needed as root in most containers).
    #[arg(long, env = "WRITEUPS2PDF_NO_SANDBOX")]
    no_sandbox: bool,

    /// pdfium shared library, or the directory containing it.
    #[arg(long, env = "WRITEUPS2PDF_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Skip the merged PDF.
    #[arg(long, env = "WRITEUPS2PDF_NO_MERGE")]
    no_merge: bool,

    /// Title of the index document.
    #[arg(long, env = "WRITEUPS2PDF_TITLE")]
    title: Option<String>,

    /// Print the run summary as JSON on stdout.
    #[arg(long, env = "WRITEUPS2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "WRITEUPS2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WRITEUPS2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WRITEUPS2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn RunProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    // ── Merge capability ─────────────────────────────────────────────────
    let merge = probe_merge(&config);
    if let Some(MergeCapability::Unavailable { ref reason }) = merge {
        if !cli.quiet && !cli.json {
            eprintln!(
                "{} {}",
                cyan("ℹ"),
                dim(&format!("Merged PDF will be skipped: {reason}"))
            );
        }
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let result =
        convert_directory_with_merge(&cli.input_dir, &cli.output_dir, &config, merge).await;
    if let Some(cb) = &cli_progress {
        cb.clear();
    }
    let summary =
        result.with_context(|| format!("Failed to convert '{}'", cli.input_dir.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .merge(!cli.no_merge)
        .chrome_sandbox(!cli.no_sandbox);

    if let Some(ref chrome) = cli.chrome {
        builder = builder.chrome_executable(chrome);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(ref title) = cli.title {
        builder = builder.collection_title(title);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    if stats.items_found == 0 {
        println!(
            "No writeups found in {}",
            bold(&summary.input_dir.display().to_string())
        );
        return;
    }

    println!("Writeups found:  {}", stats.items_found);
    println!(
        "Rendered:        {}",
        if stats.failed == 0 {
            green(&stats.succeeded.to_string())
        } else {
            format!("{}  ({} failed)", stats.succeeded, red(&stats.failed.to_string()))
        }
    );
    if !stats.index_rendered {
        println!("Index:           {}", red("not rendered"));
    }
    for item in summary.items.iter().filter(|i| i.error.is_some()) {
        if let Some(ref e) = item.error {
            println!("  {} {}", red("✗"), e);
        }
    }
    println!("Output:          {}", summary.output_dir.display());

    match &summary.merge {
        MergeStatus::Merged(report) => {
            println!(
                "Merged PDF:      {}  {}",
                bold(&report.path.display().to_string()),
                dim(&format!("({} pages)", report.page_count))
            );
            for skipped in &report.skipped {
                println!(
                    "  {} skipped {}: {}",
                    cyan("⚠"),
                    skipped.path.display(),
                    skipped.reason
                );
            }
        }
        MergeStatus::Unavailable { .. } => {
            println!("Merged PDF:      {}", dim("skipped (pdfium unavailable)"))
        }
        MergeStatus::Disabled => println!("Merged PDF:      {}", dim("disabled")),
        MergeStatus::NothingToMerge => println!("Merged PDF:      {}", dim("nothing to merge")),
        MergeStatus::Failed { detail } => {
            println!("Merged PDF:      {}", red(&format!("failed: {detail}")))
        }
    }
    println!("Duration:        {}ms", stats.total_duration_ms);
}
