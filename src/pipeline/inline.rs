//! Image inlining: rewrite `![alt](target)` references into embedded
//! `data:` URLs when the target resolves to a local file.
//!
//! ## Resolution order
//!
//! For a target string `t` and the writeup's `assets/` directory:
//!
//! 1. `t` starts with `assets/` or `./assets/` → `assets/<file name of t>`
//! 2. `t` has no `/`                           → `assets/<t>`
//! 3. otherwise                                → `assets/<file name of t>`,
//!    then `<writeup dir>/<t>`
//!
//! The first candidate that exists and can be read wins. Because the file
//! name alone is tried first, `img/a/x.png` and `img/b/x.png` both resolve to
//! `assets/x.png` when it exists; this matches how existing writeups were
//! authored and is kept as is.
//!
//! References that resolve to nothing are left byte-for-byte unchanged, so
//! inlining is idempotent: a `data:` target never names a real file.

use crate::pipeline::encode;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// Embed every resolvable image of `markdown` using files under `assets_dir`
/// (and, for nested relative paths, its parent directory).
///
/// When `assets_dir` does not exist the text is returned untouched.
pub fn inline_images(markdown: &str, assets_dir: &Path) -> String {
    if !assets_dir.is_dir() {
        return markdown.to_string();
    }

    RE_IMAGE
        .replace_all(markdown, |caps: &Captures<'_>| {
            let alt = &caps[1];
            let target = &caps[2];
            match resolve_image(target, assets_dir) {
                Some(url) => format!("![{alt}]({url})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Try each candidate path in order; return the first one that encodes.
fn resolve_image(target: &str, assets_dir: &Path) -> Option<String> {
    if target.starts_with("data:") {
        return None;
    }
    debug!("Resolving image: {}", target);

    for candidate in candidate_paths(target, assets_dir) {
        if !candidate.is_file() {
            continue;
        }
        match encode::encode_image_file(&candidate) {
            Ok(url) => {
                debug!("Embedded image: {}", candidate.display());
                return Some(url);
            }
            Err(e) => {
                warn!("Failed to read image {}: {}", candidate.display(), e);
            }
        }
    }

    warn!("Image not found: {}", target);
    None
}

/// Candidate files for `target`, in resolution order.
pub fn candidate_paths(target: &str, assets_dir: &Path) -> Vec<PathBuf> {
    let file_name = target.rsplit('/').next().unwrap_or(target);

    if target.starts_with("assets/") || target.starts_with("./assets/") {
        vec![assets_dir.join(file_name)]
    } else if !target.contains('/') {
        vec![assets_dir.join(target)]
    } else {
        let mut candidates = vec![assets_dir.join(file_name)];
        if let Some(challenge_dir) = assets_dir.parent() {
            candidates.push(challenge_dir.join(target));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n-fake-";

    /// `<tmp>/chal/assets/` with a `diagram.png`.
    fn challenge_dir() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("chal/assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("diagram.png"), PNG_BYTES).unwrap();
        (tmp, assets)
    }

    #[test]
    fn candidate_order() {
        let assets = Path::new("/w/chal/assets");
        assert_eq!(
            candidate_paths("assets/sub/x.png", assets),
            vec![PathBuf::from("/w/chal/assets/x.png")]
        );
        assert_eq!(
            candidate_paths("./assets/x.png", assets),
            vec![PathBuf::from("/w/chal/assets/x.png")]
        );
        assert_eq!(
            candidate_paths("x.png", assets),
            vec![PathBuf::from("/w/chal/assets/x.png")]
        );
        assert_eq!(
            candidate_paths("img/x.png", assets),
            vec![
                PathBuf::from("/w/chal/assets/x.png"),
                PathBuf::from("/w/chal/img/x.png"),
            ]
        );
    }

    #[test]
    fn assets_prefix_is_embedded() {
        let (_tmp, assets) = challenge_dir();
        let out = inline_images("See ![flow](assets/diagram.png) here.", &assets);
        assert!(out.starts_with("See ![flow](data:image/png;base64,"), "got: {out}");
        assert!(!out.contains("assets/diagram.png"));
        assert!(out.ends_with(") here."));
    }

    #[test]
    fn bare_file_name_is_embedded() {
        let (_tmp, assets) = challenge_dir();
        let out = inline_images("![](diagram.png)", &assets);
        assert!(out.starts_with("![](data:image/png;base64,"));
    }

    #[test]
    fn nested_path_prefers_file_name_in_assets() {
        let (tmp, assets) = challenge_dir();
        let other = tmp.path().join("chal/img");
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("diagram.png"), b"other bytes").unwrap();

        let out = inline_images("![x](img/diagram.png)", &assets);
        let expected = encode::data_url(PNG_BYTES, "image/png");
        assert_eq!(out, format!("![x]({expected})"));
    }

    #[test]
    fn nested_path_falls_back_to_challenge_dir() {
        let (tmp, assets) = challenge_dir();
        let shots = tmp.path().join("chal/screens");
        fs::create_dir_all(&shots).unwrap();
        fs::write(shots.join("login.jpg"), b"jpeg").unwrap();

        let out = inline_images("![login](screens/login.jpg)", &assets);
        assert_eq!(out, format!("![login]({})", encode::data_url(b"jpeg", "image/jpeg")));
    }

    #[test]
    fn missing_image_is_unchanged() {
        let (_tmp, assets) = challenge_dir();
        let input = "a ![gone](assets/missing.png) b ![also](x/y/z.gif)";
        assert_eq!(inline_images(input, &assets), input);
    }

    #[test]
    fn remote_image_is_unchanged() {
        let (_tmp, assets) = challenge_dir();
        let input = "![logo](https://example.org/logo.png)";
        assert_eq!(inline_images(input, &assets), input);
    }

    #[test]
    fn no_assets_dir_is_passthrough() {
        let tmp = TempDir::new().unwrap();
        let chal = tmp.path().join("chal");
        fs::create_dir_all(chal.join("img")).unwrap();
        fs::write(chal.join("img/a.png"), PNG_BYTES).unwrap();

        let input = "![a](img/a.png)";
        assert_eq!(inline_images(input, &chal.join("assets")), input);
    }

    #[test]
    fn inlining_is_idempotent() {
        let (_tmp, assets) = challenge_dir();
        let input = "# T\n\n![one](assets/diagram.png)\n\n![two](nope.png)\n";
        let once = inline_images(input, &assets);
        let twice = inline_images(&once, &assets);
        assert_eq!(once, twice);
        assert_eq!(once.matches("data:image/png;base64,").count(), 1);
    }

    #[test]
    fn unknown_extension_uses_png_mime() {
        let (_tmp, assets) = challenge_dir();
        fs::write(assets.join("scan.bmp"), b"BM").unwrap();
        let out = inline_images("![s](scan.bmp)", &assets);
        assert!(out.starts_with("![s](data:image/png;base64,"));
    }
}
