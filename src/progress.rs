//! Progress-callback trait for per-writeup conversion events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::ConverterConfigBuilder::progress_callback`] to receive
//! events as the pipeline renders each writeup.
//!
//! # Example
//!
//! ```rust
//! use writeups2pdf::{RunProgressCallback, ConverterConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, label: &str) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index, total, label);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConverterConfig::builder()
//!     .progress_callback(counter as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as it renders each writeup.
///
/// Rendering is sequential, so events for one run never overlap. The trait
/// is still `Send + Sync` because the config that carries it is shared with
/// blocking tasks. All methods default to no-ops.
pub trait RunProgressCallback: Send + Sync {
    /// Called once, after discovery and before the index is rendered.
    ///
    /// # Arguments
    /// * `total_items` — number of discovered writeups
    fn on_run_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called just before a writeup is handed to the renderer.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in discovery order
    /// * `total` — number of writeups
    /// * `label` — `category/name`
    fn on_item_start(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when a writeup's PDF has been written.
    fn on_item_complete(&self, index: usize, total: usize, label: &str) {
        let _ = (index, total, label);
    }

    /// Called when a writeup failed; the run continues with the next one.
    ///
    /// # Arguments
    /// * `error` — human-readable error description
    fn on_item_error(&self, index: usize, total: usize, label: &str, error: &str) {
        let _ = (index, total, label, error);
    }

    /// Called once after every writeup has been attempted.
    ///
    /// # Arguments
    /// * `total_items`   — number of writeups
    /// * `success_count` — writeups rendered without error
    fn on_run_complete(&self, total_items: usize, success_count: usize) {
        let _ = (total_items, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConverterConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;
