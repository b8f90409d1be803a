//! Configuration types for writeup-tree conversion.
//!
//! All run behaviour is controlled through [`ConverterConfig`], built via its
//! [`ConverterConfigBuilder`]. The input and output directories are not part
//! of the config; they are arguments of [`crate::convert::convert_directory`].

use crate::error::WriteupsError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Category directory names that switch discovery into single-category mode.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "forensics",
    "crypto",
    "web",
    "pwn",
    "reverse",
    "misc",
    "hardware",
];

/// Reserved file name of the index PDF. The leading underscore sorts it
/// before every `{category}_{name}.pdf`.
pub const DEFAULT_INDEX_FILE_NAME: &str = "_INDEX.pdf";

/// Reserved file name of the concatenated PDF.
pub const DEFAULT_MERGED_FILE_NAME: &str = "ALL_WRITEUPS_MERGED.pdf";

/// Heading of the index document.
pub const DEFAULT_COLLECTION_TITLE: &str = "CTF Writeups Collection";

/// Configuration for one conversion run.
///
/// # Example
/// ```rust
/// use writeups2pdf::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .merge(false)
///     .chrome_sandbox(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.index_file_name, "_INDEX.pdf");
/// ```
#[derive(Clone)]
pub struct ConverterConfig {
    /// Root directory names treated as a single category.
    pub categories: Vec<String>,

    /// Paper size and margins handed to the rendering engine.
    pub page: PageFormat,

    /// File name of the index PDF. Default: `_INDEX.pdf`.
    pub index_file_name: String,

    /// File name of the merged PDF. Default: `ALL_WRITEUPS_MERGED.pdf`.
    pub merged_file_name: String,

    /// Title printed at the top of the index document.
    pub collection_title: String,

    /// Concatenate all outputs when the merge capability is available. Default: true.
    pub merge: bool,

    /// Explicit Chromium/Chrome binary. If None, the usual locations and
    /// `CHROME` are searched.
    pub chrome_executable: Option<PathBuf>,

    /// Run Chromium with its sandbox. Containers running as root usually
    /// need this off. Default: true.
    pub chrome_sandbox: bool,

    /// Explicit pdfium shared library (file or containing directory).
    /// If None, `PDFIUM_LIB_PATH` and then the system library are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Directory for intermediate HTML files. If None, the system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Receives per-item events. If None, no events are emitted.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            page: PageFormat::default(),
            index_file_name: DEFAULT_INDEX_FILE_NAME.to_string(),
            merged_file_name: DEFAULT_MERGED_FILE_NAME.to_string(),
            collection_title: DEFAULT_COLLECTION_TITLE.to_string(),
            merge: true,
            chrome_executable: None,
            chrome_sandbox: true,
            pdfium_library: None,
            temp_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("categories", &self.categories)
            .field("page", &self.page)
            .field("index_file_name", &self.index_file_name)
            .field("merged_file_name", &self.merged_file_name)
            .field("collection_title", &self.collection_title)
            .field("merge", &self.merge)
            .field("chrome_executable", &self.chrome_executable)
            .field("chrome_sandbox", &self.chrome_sandbox)
            .field("pdfium_library", &self.pdfium_library)
            .field("temp_dir", &self.temp_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `dir_name` is one of the configured category labels.
    pub fn is_category(&self, dir_name: &str) -> bool {
        self.categories.iter().any(|c| c == dir_name)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn page(mut self, page: PageFormat) -> Self {
        self.config.page = page;
        self
    }

    pub fn index_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_file_name = name.into();
        self
    }

    pub fn merged_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.merged_file_name = name.into();
        self
    }

    pub fn collection_title(mut self, title: impl Into<String>) -> Self {
        self.config.collection_title = title.into();
        self
    }

    pub fn merge(mut self, v: bool) -> Self {
        self.config.merge = v;
        self
    }

    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_executable = Some(path.into());
        self
    }

    pub fn chrome_sandbox(mut self, v: bool) -> Self {
        self.config.chrome_sandbox = v;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, WriteupsError> {
        let c = &self.config;
        for (what, name) in [
            ("index file name", &c.index_file_name),
            ("merged file name", &c.merged_file_name),
        ] {
            if !name.ends_with(".pdf") || name.len() <= ".pdf".len() {
                return Err(WriteupsError::InvalidConfig(format!(
                    "{what} must be a non-empty name ending in .pdf, got '{name}'"
                )));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(WriteupsError::InvalidConfig(format!(
                    "{what} must be a bare file name, got '{name}'"
                )));
            }
        }
        if c.index_file_name == c.merged_file_name {
            return Err(WriteupsError::InvalidConfig(
                "index and merged file names must differ".into(),
            ));
        }
        c.page.validate()?;
        Ok(self.config)
    }
}

// ── Page format ──────────────────────────────────────────────────────────

const CM_PER_INCH: f64 = 2.54;

/// Paper size and margins for printed documents.
///
/// Chromium's print API takes inches; the style sheet takes CSS units. Both
/// are derived from this one struct so they cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    /// Paper width in inches.
    pub width_in: f64,
    /// Paper height in inches.
    pub height_in: f64,
    /// Margin on all four sides, in centimetres.
    pub margin_cm: f64,
    /// Print CSS backgrounds (code blocks, header gradient).
    pub print_background: bool,
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageFormat {
    /// ISO A4 (210 × 297 mm) with 2cm margins.
    pub fn a4() -> Self {
        Self {
            width_in: 8.27,
            height_in: 11.69,
            margin_cm: 2.0,
            print_background: true,
        }
    }

    /// Margin converted to inches.
    pub fn margin_in(&self) -> f64 {
        self.margin_cm / CM_PER_INCH
    }

    fn validate(&self) -> Result<(), WriteupsError> {
        if self.width_in <= 0.0 || self.height_in <= 0.0 {
            return Err(WriteupsError::InvalidConfig(format!(
                "page size must be positive, got {}in × {}in",
                self.width_in, self.height_in
            )));
        }
        let margin = self.margin_in();
        if margin < 0.0 || margin * 2.0 >= self.width_in.min(self.height_in) {
            return Err(WriteupsError::InvalidConfig(format!(
                "margin {}cm does not fit a {}in × {}in page",
                self.margin_cm, self.width_in, self.height_in
            )));
        }
        Ok(())
    }
}
