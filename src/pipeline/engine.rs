//! Rendering engine: HTML file in, PDF bytes out.
//!
//! [`RenderEngine`] is the seam between the pipeline and the browser. The
//! production implementation, [`ChromiumEngine`], drives one headless
//! Chromium process over the DevTools protocol for the whole run and opens
//! one tab per document. Starting Chromium costs far more than a tab, so the
//! handle is launched once, borrowed by every render call, and closed once.
//!
//! Tests substitute their own engine to exercise the orchestration without a
//! browser.

use crate::config::{ConverterConfig, PageFormat};
use crate::error::{EngineError, WriteupsError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Something that can print a local HTML file to PDF.
///
/// Calls are strictly sequential; implementations need no internal locking
/// beyond what `Send + Sync` already demands.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Load `html_file` and print it with the given paper size and margins.
    async fn print_to_pdf(&self, html_file: &Path, page: &PageFormat)
        -> Result<Vec<u8>, EngineError>;
}

/// Resolve the browser configuration without starting anything.
///
/// This is the startup capability check: it fails when no Chromium/Chrome
/// executable can be found.
pub fn browser_config(config: &ConverterConfig) -> Result<BrowserConfig, WriteupsError> {
    let mut builder = BrowserConfig::builder();
    if let Some(ref path) = config.chrome_executable {
        if !path.is_file() {
            return Err(WriteupsError::BrowserUnavailable {
                detail: format!("'{}' is not a file", path.display()),
            });
        }
        builder = builder.chrome_executable(path);
    }
    if !config.chrome_sandbox {
        builder = builder.no_sandbox();
    }
    builder
        .build()
        .map_err(|detail| WriteupsError::BrowserUnavailable { detail })
}

/// A running headless Chromium and the task pumping its DevTools events.
pub struct ChromiumEngine {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumEngine {
    /// Start the browser. Fatal on failure: nothing can be rendered without it.
    pub async fn launch(browser_config: BrowserConfig) -> Result<Self, WriteupsError> {
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| WriteupsError::BrowserLaunchFailed(e.to_string()))?;

        // The handler must be polled for any browser call to make progress.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("DevTools handler: {}", e);
                }
            }
        });

        info!("Headless browser started");
        Ok(Self { browser, handler })
    }

    /// Shut the browser down and reap the process.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        self.handler.abort();
        info!("Headless browser stopped");
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn print_to_pdf(
        &self,
        html_file: &Path,
        page: &PageFormat,
    ) -> Result<Vec<u8>, EngineError> {
        let url = file_url(html_file)?;
        let tab = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::PageOpen(e.to_string()))?;

        let result = async {
            tab.goto(url.as_str())
                .await
                .map_err(|e| EngineError::Navigation {
                    url: url.clone(),
                    detail: e.to_string(),
                })?;
            tab.pdf(print_params(page))
                .await
                .map_err(|e| EngineError::Print(e.to_string()))
        }
        .await;

        if let Err(e) = tab.close().await {
            debug!("Failed to close tab for {}: {}", url, e);
        }

        let bytes = result?;
        debug!("Printed {} → {} bytes", url, bytes.len());
        Ok(bytes)
    }
}

/// DevTools print parameters for `page`.
pub fn print_params(page: &PageFormat) -> PrintToPdfParams {
    let margin = page.margin_in();
    PrintToPdfParams {
        print_background: Some(page.print_background),
        paper_width: Some(page.width_in),
        paper_height: Some(page.height_in),
        margin_top: Some(margin),
        margin_bottom: Some(margin),
        margin_left: Some(margin),
        margin_right: Some(margin),
        ..Default::default()
    }
}

/// Percent-encoded `file://` URL for a local path, absolutised first.
pub fn file_url(path: &Path) -> Result<String, EngineError> {
    let absolute = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    };
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| EngineError::Navigation {
            url: absolute.display().to_string(),
            detail: "path cannot be expressed as a file:// URL".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_print_params() {
        let params = print_params(&PageFormat::a4());
        assert_eq!(params.paper_width, Some(8.27));
        assert_eq!(params.paper_height, Some(11.69));
        assert_eq!(params.print_background, Some(true));
        let m = params.margin_left.unwrap();
        assert!((m - 2.0 / 2.54).abs() < 1e-9);
        assert_eq!(params.margin_top, params.margin_right);
    }

    #[test]
    fn file_url_is_absolute() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("doc.html");
        std::fs::write(&path, "<p/>").unwrap();
        let url = file_url(&path).unwrap();
        assert!(url.starts_with("file:///"));
        assert!(url.ends_with("doc.html"));
    }

    #[test]
    fn file_url_escapes_reserved_characters() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("ctf#2025 100%?");
        std::fs::create_dir(&dir).unwrap();
        let path = dir.join("doc.html");
        std::fs::write(&path, "<p/>").unwrap();

        let url = file_url(&path).unwrap();
        assert!(!url.contains('#'));
        assert!(!url.contains('?'));
        assert!(!url.contains(' '));
        assert!(url.contains("ctf%232025%20100%25%3F"));

        let back = Url::parse(&url).unwrap().to_file_path().unwrap();
        assert_eq!(back, path.canonicalize().unwrap());
    }

    #[test]
    fn missing_explicit_chrome_is_unavailable() {
        let config = ConverterConfig::builder()
            .chrome_executable("/definitely/not/chrome")
            .build()
            .unwrap();
        assert!(matches!(
            browser_config(&config),
            Err(WriteupsError::BrowserUnavailable { .. })
        ));
    }
}
