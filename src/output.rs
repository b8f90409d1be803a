//! Data types flowing through the pipeline and the final run summary.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One discovered writeup: a directory holding a `README.md`.
///
/// Created by discovery and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Category, taken from the parent (or root) directory name.
    pub category: String,
    /// Challenge name, taken from the challenge directory name.
    pub name: String,
    /// The challenge directory.
    pub source_dir: PathBuf,
    /// `source_dir/README.md`.
    pub readme: PathBuf,
}

impl Challenge {
    /// `category/name`, used in logs and error messages.
    pub fn label(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    /// `source_dir/assets`, whether or not it exists.
    pub fn assets_dir(&self) -> PathBuf {
        self.source_dir.join("assets")
    }

    /// Deterministic PDF file name: `{category}_{name}.pdf` with spaces in
    /// the name replaced by underscores.
    pub fn output_file_name(&self) -> String {
        format!("{}_{}.pdf", self.category, self.name.replace(' ', "_"))
    }
}

/// What a rendered PDF contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputKind {
    /// The generated index of all writeups.
    Index,
    /// One writeup.
    Challenge { category: String, name: String },
}

/// A PDF produced during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOutput {
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: OutputKind,
}

impl RenderedOutput {
    pub fn is_index(&self) -> bool {
        matches!(self.kind, OutputKind::Index)
    }

    /// File name component of `path`, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Merge ordering key: the index first, then by file name.
    pub fn sort_key(&self) -> (u8, String) {
        (if self.is_index() { 0 } else { 1 }, self.file_name())
    }
}

/// Outcome for a single writeup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub category: String,
    pub name: String,
    /// Set when the PDF was written.
    pub output: Option<PathBuf>,
    pub duration_ms: u64,
    /// Set when rendering failed.
    pub error: Option<ItemError>,
}

/// An output left out of the merged document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedOutput {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a successful concatenation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub path: PathBuf,
    /// Total pages written, separators included.
    pub page_count: usize,
    /// Outputs that made it in, in merge order.
    pub included: Vec<PathBuf>,
    pub skipped: Vec<SkippedOutput>,
}

/// What happened to the merge step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeStatus {
    Merged(MergeReport),
    /// The merge capability could not be loaded; per-item PDFs still exist.
    Unavailable { reason: String },
    /// Merging was turned off in the config.
    Disabled,
    /// No PDF was produced, so there was nothing to merge.
    NothingToMerge,
    /// Writing the merged document failed.
    Failed { detail: String },
}

impl MergeStatus {
    /// Path of the merged PDF, when one was written.
    pub fn merged_path(&self) -> Option<&PathBuf> {
        match self {
            MergeStatus::Merged(report) => Some(&report.path),
            _ => None,
        }
    }
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub items_found: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Whether the index PDF was written.
    pub index_rendered: bool,
    pub render_duration_ms: u64,
    pub merge_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a caller needs to report on a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub items: Vec<ItemResult>,
    /// Every PDF written this run (index included), in render order.
    pub outputs: Vec<RenderedOutput>,
    pub merge: MergeStatus,
    pub stats: RunStats,
}

impl RunSummary {
    /// A summary for a tree with no writeups in it.
    pub fn empty(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            items: Vec::new(),
            outputs: Vec::new(),
            merge: MergeStatus::NothingToMerge,
            stats: RunStats::default(),
        }
    }
}
