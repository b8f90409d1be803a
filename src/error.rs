//! Error types for the writeups2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WriteupsError`] — **Fatal**: the run cannot start at all (input
//!   directory missing, no browser to render with, unusable output directory).
//!   Returned as `Err(WriteupsError)` from [`crate::convert::convert_directory`].
//!
//! * [`ItemError`] — **Non-fatal**: a single writeup failed to render but
//!   every other writeup is fine. Stored inside [`crate::output::ItemResult`]
//!   so callers see partial success instead of losing the whole run.
//!
//! [`EngineError`] is what the rendering engine reports; the renderer wraps it
//! into [`ItemError::RenderFailed`] together with the item's identity.
//!
//! [`MergeError`] is what a PDF assembler reports. It never aborts a run and
//! surfaces as [`crate::output::MergeStatus::Failed`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the writeups2pdf library.
#[derive(Debug, Error)]
pub enum WriteupsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input directory was not found at the given path.
    #[error("Input path does not exist: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Input path exists but is a file.
    #[error("Input path is not a directory: '{path}'")]
    InputNotADirectory { path: PathBuf },

    /// Input directory could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Browser errors ────────────────────────────────────────────────────
    /// No Chromium/Chrome executable could be located.
    #[error(
        "No Chromium or Chrome executable found: {detail}\n\n\
Install Chromium (e.g. `apt install chromium`) or point to an existing\n\
binary with --chrome /path/to/chrome (or WRITEUPS2PDF_CHROME).\n"
    )]
    BrowserUnavailable { detail: String },

    /// The browser executable was found but failed to start.
    #[error("Failed to launch headless browser: {0}\nInside containers try --no-sandbox.")]
    BrowserLaunchFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single rendered document.
///
/// `item` is the `category/name` label of the writeup (or the index label).
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// README.md could not be read.
    #[error("{item}: failed to read '{path}': {detail}")]
    ReadFailed {
        item: String,
        path: PathBuf,
        detail: String,
    },

    /// The intermediate HTML file could not be created or written.
    #[error("{item}: failed to write temporary HTML: {detail}")]
    TempFileFailed { item: String, detail: String },

    /// The rendering engine failed to produce a PDF.
    #[error("{item}: rendering failed: {detail}")]
    RenderFailed { item: String, detail: String },

    /// The PDF bytes could not be written to the output directory.
    #[error("{item}: failed to write '{path}': {detail}")]
    WriteFailed {
        item: String,
        path: PathBuf,
        detail: String,
    },
}

impl ItemError {
    /// The `category/name` label the error belongs to.
    pub fn item(&self) -> &str {
        match self {
            ItemError::ReadFailed { item, .. }
            | ItemError::TempFileFailed { item, .. }
            | ItemError::RenderFailed { item, .. }
            | ItemError::WriteFailed { item, .. } => item,
        }
    }
}

/// Errors reported by a [`crate::pipeline::engine::RenderEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// A new rendering context (browser tab) could not be opened.
    #[error("failed to open page: {0}")]
    PageOpen(String),

    /// The document could not be loaded into the page.
    #[error("failed to load '{url}': {detail}")]
    Navigation { url: String, detail: String },

    /// The engine failed while printing the page to PDF.
    #[error("print to PDF failed: {0}")]
    Print(String),
}

/// The merged document could not be produced.
#[derive(Debug, Error)]
#[error("Failed to write merged PDF '{path}': {detail}")]
pub struct MergeError {
    pub path: PathBuf,
    pub detail: String,
}
