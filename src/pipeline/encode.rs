//! Image encoding: file bytes → `data:` URL.
//!
//! The rendering engine loads each document from a temporary file, so
//! relative image paths would resolve against the temp directory rather than
//! the writeup. Embedding the bytes makes every document self-contained.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// MIME type used when the extension is not recognised.
pub const FALLBACK_MIME: &str = "image/png";

/// MIME type for an image path, chosen by extension (case-insensitive).
///
/// Unrecognised or missing extensions fall back to [`FALLBACK_MIME`].
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => FALLBACK_MIME,
    }
}

/// Wrap raw bytes in a base64 `data:` URL.
pub fn data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Read an image file and return it as a `data:` URL.
pub fn encode_image_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let url = data_url(&bytes, mime_for_path(path));
    debug!("Encoded {} → {} bytes data URL", path.display(), url.len());
    Ok(url)
}
