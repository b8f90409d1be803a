//! Document rendering: one writeup (or the index) → one PDF file.
//!
//! Steps per document:
//!
//! ```text
//! README.md ─▶ title block ─▶ inline images ─▶ HTML ─▶ temp file ─▶ engine ─▶ {category}_{name}.pdf
//! ```
//!
//! The intermediate HTML lives in a [`tempfile::NamedTempFile`], which is
//! removed when it goes out of scope, on the success path and on every
//! error path alike.

use crate::config::ConverterConfig;
use crate::error::ItemError;
use crate::output::{Challenge, OutputKind, RenderedOutput};
use crate::pipeline::engine::RenderEngine;
use crate::pipeline::{html, inline};
use crate::templates;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Render one writeup into `output_dir/{category}_{name}.pdf`.
pub async fn render_challenge(
    engine: &dyn RenderEngine,
    challenge: &Challenge,
    output_dir: &Path,
    config: &ConverterConfig,
) -> Result<RenderedOutput, ItemError> {
    let label = challenge.label();
    info!("Rendering {}", label);

    let raw = tokio::fs::read_to_string(&challenge.readme)
        .await
        .map_err(|e| ItemError::ReadFailed {
            item: label.clone(),
            path: challenge.readme.clone(),
            detail: e.to_string(),
        })?;

    let mut markdown = templates::title_block(&challenge.name, &challenge.category);
    markdown.push_str(&raw);
    let markdown = inline::inline_images(&markdown, &challenge.assets_dir());

    let output = output_dir.join(challenge.output_file_name());
    render_markdown(engine, &markdown, &challenge.name, &output, &label, config).await?;

    info!("Created {}", output.display());
    Ok(RenderedOutput {
        path: output,
        kind: OutputKind::Challenge {
            category: challenge.category.clone(),
            name: challenge.name.clone(),
        },
    })
}

/// Markdown → HTML → temp file → PDF at `output`.
///
/// `label` identifies the document in errors.
pub async fn render_markdown(
    engine: &dyn RenderEngine,
    markdown: &str,
    title: &str,
    output: &Path,
    label: &str,
    config: &ConverterConfig,
) -> Result<(), ItemError> {
    let document = html::markdown_to_html(markdown, title, &config.page);

    let temp = write_temp_html(&document, config).map_err(|e| ItemError::TempFileFailed {
        item: label.to_string(),
        detail: e.to_string(),
    })?;
    debug!("{}: HTML at {}", label, temp.path().display());

    let printed = engine.print_to_pdf(temp.path(), &config.page).await;

    if let Err(e) = temp.close() {
        warn!("{}: failed to remove temporary HTML: {}", label, e);
    }

    let bytes = printed.map_err(|e| ItemError::RenderFailed {
        item: label.to_string(),
        detail: e.to_string(),
    })?;

    tokio::fs::write(output, &bytes)
        .await
        .map_err(|e| ItemError::WriteFailed {
            item: label.to_string(),
            path: output.to_path_buf(),
            detail: e.to_string(),
        })
}

/// Write `document` to a uniquely named `.html` temp file.
fn write_temp_html(document: &str, config: &ConverterConfig) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("writeup-").suffix(".html");
    let mut file = match config.temp_dir {
        Some(ref dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(document.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageFormat;
    use crate::error::EngineError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records the HTML it was given and returns a stub PDF.
    #[derive(Default)]
    struct CapturingEngine {
        html: Mutex<Vec<(PathBuf, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl RenderEngine for CapturingEngine {
        async fn print_to_pdf(
            &self,
            html_file: &Path,
            _page: &PageFormat,
        ) -> Result<Vec<u8>, EngineError> {
            let content = std::fs::read_to_string(html_file).unwrap_or_default();
            self.html
                .lock()
                .unwrap()
                .push((html_file.to_path_buf(), content));
            if self.fail {
                return Err(EngineError::Print("boom".into()));
            }
            Ok(b"%PDF-1.7\n%stub\n".to_vec())
        }
    }

    fn challenge_with_image(root: &Path) -> Challenge {
        let dir = root.join("web/chal 2");
        std::fs::create_dir_all(dir.join("assets")).unwrap();
        std::fs::write(dir.join("assets/diagram.png"), b"\x89PNG fake").unwrap();
        std::fs::write(
            dir.join("README.md"),
            "## Recon\n\n![diagram](assets/diagram.png)\n",
        )
        .unwrap();
        Challenge {
            category: "web".into(),
            name: "chal 2".into(),
            readme: dir.join("README.md"),
            source_dir: dir,
        }
    }

    fn config_in(temp: &Path) -> ConverterConfig {
        ConverterConfig::builder().temp_dir(temp).build().unwrap()
    }

    #[tokio::test]
    async fn renders_to_deterministic_path() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let scratch = tmp.path().join("scratch");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::create_dir_all(&scratch).unwrap();
        let challenge = challenge_with_image(tmp.path());
        let engine = CapturingEngine::default();

        let rendered = render_challenge(&engine, &challenge, &out, &config_in(&scratch))
            .await
            .expect("render should succeed");

        assert_eq!(rendered.path, out.join("web_chal_2.pdf"));
        assert!(rendered.path.is_file());
        assert!(!rendered.is_index());
    }

    #[tokio::test]
    async fn html_has_title_block_and_embedded_image() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let scratch = tmp.path().join("scratch");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::create_dir_all(&scratch).unwrap();
        let challenge = challenge_with_image(tmp.path());
        let engine = CapturingEngine::default();

        render_challenge(&engine, &challenge, &out, &config_in(&scratch))
            .await
            .unwrap();

        let captured = engine.html.lock().unwrap();
        let (_, html) = &captured[0];
        assert!(html.contains("<h1>chal 2</h1>"));
        assert!(html.contains("<strong>Category:</strong> web"));
        assert!(html.contains("data:image/png;base64,"));
        assert!(!html.contains("assets/diagram.png"));
    }

    #[tokio::test]
    async fn temp_html_removed_on_success_and_failure() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let scratch = tmp.path().join("scratch");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::create_dir_all(&scratch).unwrap();
        let challenge = challenge_with_image(tmp.path());
        let config = config_in(&scratch);

        let ok = CapturingEngine::default();
        render_challenge(&ok, &challenge, &out, &config).await.unwrap();

        let failing = CapturingEngine {
            fail: true,
            ..Default::default()
        };
        let err = render_challenge(&failing, &challenge, &out, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::RenderFailed { .. }));
        assert_eq!(err.item(), "web/chal 2");

        for engine in [&ok, &failing] {
            for (path, _) in engine.html.lock().unwrap().iter() {
                assert!(path.starts_with(&scratch));
                assert!(!path.exists(), "{} should be deleted", path.display());
            }
        }
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_readme_is_read_failure() {
        let tmp = TempDir::new().unwrap();
        let challenge = Challenge {
            category: "pwn".into(),
            name: "ghost".into(),
            source_dir: tmp.path().join("pwn/ghost"),
            readme: tmp.path().join("pwn/ghost/README.md"),
        };
        let engine = CapturingEngine::default();
        let err = render_challenge(&engine, &challenge, tmp.path(), &ConverterConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::ReadFailed { .. }));
        assert!(engine.html.lock().unwrap().is_empty());
    }
}
