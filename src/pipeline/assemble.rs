//! Concatenation of all rendered PDFs into one document, with a labelled
//! separator page in front of each.
//!
//! ## Why capability-checked?
//!
//! Merging needs the pdfium shared library, which is loaded at runtime and
//! is often not installed. Rendering does not need it, so a missing library
//! must not cost the user their per-writeup PDFs. [`detect`] probes the
//! library once at startup and returns either a working assembler or the
//! reason why merging is skipped.
//!
//! ## Layout
//!
//! ```text
//! [INDEX separator][index pages][Crypto Rsa separator][crypto_rsa pages]...
//! ```
//!
//! The index always comes first, everything else sorts by file name.
//! Each separator is built in a transient in-memory document together with
//! the pages that follow it, then appended to the result in one step, so a
//! failing output never leaves an orphan separator behind.
//!
//! pdfium calls are blocking; the orchestrator runs [`PdfAssembler::assemble`]
//! inside `tokio::task::spawn_blocking`.

use crate::config::{ConverterConfig, PageFormat};
use crate::error::MergeError;
use crate::output::{MergeReport, RenderedOutput, SkippedOutput};
use pdfium_render::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variable naming a pdfium library file or its directory.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// Separator label of the index document.
pub const INDEX_SEPARATOR_LABEL: &str = "INDEX";

const SEPARATOR_FONT_SIZE: f32 = 24.0;
const UNDERLINE_OFFSET: f32 = 10.0;
const UNDERLINE_WIDTH: f32 = 2.0;

/// RGB (0.2, 0.3, 0.5).
fn separator_background() -> PdfColor {
    PdfColor::new(51, 77, 128, 255)
}

/// Concatenates rendered outputs into one PDF at `dest`.
pub trait PdfAssembler: Send + Sync {
    fn assemble(
        &self,
        outputs: &[RenderedOutput],
        dest: &Path,
    ) -> Result<MergeReport, MergeError>;
}

/// Result of the startup probe.
#[derive(Clone)]
pub enum MergeCapability {
    Available(Arc<dyn PdfAssembler>),
    Unavailable { reason: String },
}

impl fmt::Debug for MergeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeCapability::Available(_) => f.write_str("Available(<dyn PdfAssembler>)"),
            MergeCapability::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

impl MergeCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, MergeCapability::Available(_))
    }
}

/// Probe for pdfium and build the matching capability.
pub fn detect(config: &ConverterConfig) -> MergeCapability {
    let library = PdfiumLibrary::locate(config);
    match library.bind() {
        Ok(_) => {
            info!("PDF merging available ({})", library);
            MergeCapability::Available(Arc::new(PdfiumAssembler::new(library, config.page)))
        }
        Err(detail) => {
            let reason = format!("pdfium could not be loaded from {}: {}", library, detail);
            debug!("{}", reason);
            MergeCapability::Unavailable { reason }
        }
    }
}

// ── Library location ─────────────────────────────────────────────────────

/// Where the pdfium shared library is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfiumLibrary {
    At(PathBuf),
    System,
}

impl PdfiumLibrary {
    /// Config path first, then `PDFIUM_LIB_PATH`, then the system library.
    /// A directory is expanded to the platform library name inside it.
    pub fn locate(config: &ConverterConfig) -> Self {
        let explicit = config
            .pdfium_library
            .clone()
            .or_else(|| std::env::var_os(PDFIUM_LIB_ENV).map(PathBuf::from));
        match explicit {
            Some(path) if path.is_dir() => {
                PdfiumLibrary::At(Pdfium::pdfium_platform_library_name_at_path(&path))
            }
            Some(path) => PdfiumLibrary::At(path),
            None => PdfiumLibrary::System,
        }
    }

    /// Load the library.
    pub fn bind(&self) -> Result<Pdfium, String> {
        let bindings = match self {
            PdfiumLibrary::At(path) => Pdfium::bind_to_library(path),
            PdfiumLibrary::System => Pdfium::bind_to_system_library(),
        };
        bindings.map(Pdfium::new).map_err(|e| format!("{:?}", e))
    }
}

impl fmt::Display for PdfiumLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfiumLibrary::At(path) => write!(f, "'{}'", path.display()),
            PdfiumLibrary::System => f.write_str("the system library path"),
        }
    }
}

// ── Pdfium assembler ─────────────────────────────────────────────────────

/// [`PdfAssembler`] backed by pdfium.
pub struct PdfiumAssembler {
    library: PdfiumLibrary,
    page: PageFormat,
}

impl PdfiumAssembler {
    pub fn new(library: PdfiumLibrary, page: PageFormat) -> Self {
        Self { library, page }
    }
}

impl PdfAssembler for PdfiumAssembler {
    fn assemble(
        &self,
        outputs: &[RenderedOutput],
        dest: &Path,
    ) -> Result<MergeReport, MergeError> {
        let merge_err = |detail: String| MergeError {
            path: dest.to_path_buf(),
            detail,
        };

        let pdfium = self.library.bind().map_err(merge_err)?;
        let mut merged = pdfium
            .create_new_pdf()
            .map_err(|e| merge_err(format!("{:?}", e)))?;

        let mut included = Vec::new();
        let mut skipped = Vec::new();

        for output in merge_order(outputs) {
            if !output.path.is_file() {
                warn!("Skipping missing output {}", output.path.display());
                skipped.push(SkippedOutput {
                    path: output.path.clone(),
                    reason: "file not found".into(),
                });
                continue;
            }

            let label = separator_label(output);
            match append_with_separator(&pdfium, &mut merged, output, &label, &self.page) {
                Ok(pages) => {
                    debug!("Merged {} ({} pages)", output.path.display(), pages);
                    included.push(output.path.clone());
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", output.path.display(), reason);
                    skipped.push(SkippedOutput {
                        path: output.path.clone(),
                        reason,
                    });
                }
            }
        }

        if included.is_empty() {
            return Err(merge_err(format!(
                "none of the {} outputs could be read",
                outputs.len()
            )));
        }

        let page_count = merged.pages().len() as usize;
        merged
            .save_to_file(dest)
            .map_err(|e| merge_err(format!("{:?}", e)))?;

        info!(
            "Merged {} documents ({} pages) into {}",
            included.len(),
            page_count,
            dest.display()
        );
        Ok(MergeReport {
            path: dest.to_path_buf(),
            page_count,
            included,
            skipped,
        })
    }
}

/// Outputs sorted for merging: the index first, then by file name.
pub fn merge_order(outputs: &[RenderedOutput]) -> Vec<&RenderedOutput> {
    let mut ordered: Vec<&RenderedOutput> = outputs.iter().collect();
    ordered.sort_by_key(|o| o.sort_key());
    ordered
}

/// Append separator + every page of `output` to `merged`.
///
/// Returns the number of pages of the output itself.
fn append_with_separator(
    pdfium: &Pdfium,
    merged: &mut PdfDocument<'_>,
    output: &RenderedOutput,
    label: &str,
    page: &PageFormat,
) -> Result<usize, String> {
    let source = pdfium
        .load_pdf_from_file(&output.path, None)
        .map_err(|e| format!("unreadable PDF: {:?}", e))?;
    let pages = source.pages().len() as usize;

    let mut section = separator_document(pdfium, label, page)
        .map_err(|e| format!("separator page: {:?}", e))?;
    section
        .pages_mut()
        .append(&source)
        .map_err(|e| format!("failed to copy pages: {:?}", e))?;
    merged
        .pages_mut()
        .append(&section)
        .map_err(|e| format!("failed to append section: {:?}", e))?;
    Ok(pages)
}

/// A one-page document: solid background, centred bold label, underline.
fn separator_document<'a>(
    pdfium: &'a Pdfium,
    label: &str,
    format: &PageFormat,
) -> Result<PdfDocument<'a>, PdfiumError> {
    let mut document = pdfium.create_new_pdf()?;
    let font = document.fonts_mut().helvetica_bold();

    let size = PdfPagePaperSize::Custom(
        PdfPoints::from_inches(format.width_in as f32),
        PdfPoints::from_inches(format.height_in as f32),
    );
    let mut page = document.pages_mut().create_page_at_end(size)?;
    let width = page.width();
    let height = page.height();

    page.objects_mut().create_path_object_rect(
        PdfRect::new(PdfPoints::ZERO, PdfPoints::ZERO, height, width),
        None,
        None,
        Some(separator_background()),
    )?;

    let mut text =
        PdfPageTextObject::new(&document, label, font, PdfPoints::new(SEPARATOR_FONT_SIZE))?;
    text.set_fill_color(PdfColor::WHITE)?;
    let mut text = page.objects_mut().add_text_object(text)?;

    let text_width = text.width()?;
    let x = (width - text_width) / 2.0;
    let y = height / 2.0;
    text.translate(x, y)?;

    let underline_y = y - PdfPoints::new(UNDERLINE_OFFSET);
    page.objects_mut().create_path_object_line(
        x,
        underline_y,
        x + text_width,
        underline_y,
        PdfColor::WHITE,
        PdfPoints::new(UNDERLINE_WIDTH),
    )?;

    Ok(document)
}

// ── Labels ───────────────────────────────────────────────────────────────

/// Separator text for an output: `INDEX` for the index, otherwise the file
/// stem with underscores as spaces, title-cased.
pub fn separator_label(output: &RenderedOutput) -> String {
    if output.is_index() {
        return INDEX_SEPARATOR_LABEL.to_string();
    }
    let stem = output
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    title_case(&stem.replace('_', " "))
}

/// Upper-case every letter that follows a non-letter, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(ch);
            after_letter = false;
        }
    }
    out
}
