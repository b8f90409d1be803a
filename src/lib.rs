//! # writeups2pdf
//!
//! Batch-convert a tree of CTF writeups (`category/challenge/README.md`)
//! into one PDF per writeup, an index PDF, and optionally a single merged
//! PDF with a separator page in front of every document.
//!
//! ## Why a browser?
//!
//! Writeups are GitHub-flavoured markdown with code blocks, tables and
//! screenshots. A headless Chromium prints HTML with the same typography a
//! reader sees on the web, so the crate only has to produce good HTML. Images
//! are embedded as `data:` URLs first, which makes every document
//! self-contained before it reaches the browser.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Discover  category/challenge/README.md (single category or collection)
//!  ├─ 2. Index     summary of all writeups grouped by category
//!  ├─ 3. Inline    local images → data: URLs
//!  ├─ 4. Render    markdown → HTML → PDF through one headless Chromium
//!  └─ 5. Merge     separator pages + every PDF via pdfium (optional)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use writeups2pdf::{convert_directory, ConverterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConverterConfig::default();
//!     let summary = convert_directory("ctf-2025", "pdf", &config).await?;
//!     println!(
//!         "{}/{} writeups rendered",
//!         summary.stats.succeeded, summary.stats.items_found
//!     );
//!     if let Some(merged) = summary.merge.merged_path() {
//!         println!("merged: {}", merged.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `writeups2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! writeups2pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! | Component | Needed for | Located via |
//! |-----------|------------|-------------|
//! | Chromium / Chrome | rendering (mandatory) | `chrome_executable`, `CHROME`, standard install paths |
//! | pdfium shared library | merging (optional) | `pdfium_library`, `PDFIUM_LIB_PATH`, system library path |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder, PageFormat};
pub use convert::{
    convert_directory, convert_directory_sync, convert_directory_with_merge, convert_with_engine,
    probe_merge,
};
pub use error::{EngineError, ItemError, MergeError, WriteupsError};
pub use output::{
    Challenge, ItemResult, MergeReport, MergeStatus, OutputKind, RenderedOutput, RunStats,
    RunSummary, SkippedOutput,
};
pub use pipeline::assemble::{MergeCapability, PdfAssembler};
pub use pipeline::engine::RenderEngine;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
