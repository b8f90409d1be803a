//! Run orchestration: discovery, index, per-writeup rendering, merge.
//!
//! ## Why one browser for the whole run?
//!
//! Starting Chromium takes longer than rendering a typical writeup. The
//! orchestrator launches it once, renders the index and then every writeup
//! strictly in order through the same handle, and closes it once, whether
//! or not individual writeups failed. A failed launch aborts the run before
//! anything is written.
//!
//! Per-writeup failures are recorded in [`ItemResult`] and never stop the
//! run. Merging happens after the browser is closed and is best-effort as
//! well: its outcome is reported through [`MergeStatus`].

use crate::config::ConverterConfig;
use crate::error::WriteupsError;
use crate::output::{Challenge, ItemResult, MergeStatus, RenderedOutput, RunStats, RunSummary};
use crate::pipeline::assemble::{self, MergeCapability};
use crate::pipeline::engine::{self, ChromiumEngine, RenderEngine};
use crate::pipeline::{discover, index, render};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert every writeup under `input` into PDFs inside `output_dir`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunSummary)` once every writeup has been attempted, even if some
/// failed (check `summary.stats.failed`).
///
/// # Errors
/// Returns `Err(WriteupsError)` only for fatal errors:
/// - input directory missing or not a directory
/// - output directory cannot be created
/// - no browser executable, or the browser fails to start
pub async fn convert_directory(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<RunSummary, WriteupsError> {
    run_with_browser(input.as_ref(), output_dir.as_ref(), config, || probe_merge(config)).await
}

/// Like [`convert_directory`], with a merge capability probed by the caller
/// (see [`probe_merge`]). `None` disables merging.
pub async fn convert_directory_with_merge(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConverterConfig,
    merge: Option<MergeCapability>,
) -> Result<RunSummary, WriteupsError> {
    run_with_browser(input.as_ref(), output_dir.as_ref(), config, move || merge).await
}

/// Run the pipeline with a caller-supplied engine and merge capability.
///
/// The engine's lifecycle stays with the caller. `merge` is ignored when
/// `config.merge` is off.
pub async fn convert_with_engine(
    engine: &dyn RenderEngine,
    merge: MergeCapability,
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<RunSummary, WriteupsError> {
    let total_start = Instant::now();
    let input_dir = discover::resolve_input_dir(input.as_ref())?;
    let output_dir = create_output_dir(output_dir.as_ref()).await?;

    let challenges = discover::discover(&input_dir, config)?;
    if challenges.is_empty() {
        warn!("No writeups found under {}", input_dir.display());
        return Ok(RunSummary::empty(input_dir, output_dir));
    }

    let merge = config.merge.then_some(merge);
    let run = render_all(engine, &challenges, &output_dir, config).await;
    Ok(finish(run, merge.as_ref(), input_dir, output_dir, config, total_start).await)
}

/// Synchronous wrapper around [`convert_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_directory_sync(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConverterConfig,
) -> Result<RunSummary, WriteupsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| WriteupsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_directory(input, output_dir, config))
}

/// Merge capability for this run, or `None` when merging is turned off.
pub fn probe_merge(config: &ConverterConfig) -> Option<MergeCapability> {
    if !config.merge {
        return None;
    }
    let capability = assemble::detect(config);
    if let MergeCapability::Unavailable { ref reason } = capability {
        info!("PDF merging unavailable, skipping: {}", reason);
    }
    Some(capability)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// What the render phase produced.
struct RenderRun {
    items: Vec<ItemResult>,
    outputs: Vec<RenderedOutput>,
    index_rendered: bool,
    duration_ms: u64,
}

async fn run_with_browser(
    input: &Path,
    output_dir: &Path,
    config: &ConverterConfig,
    merge: impl FnOnce() -> Option<MergeCapability>,
) -> Result<RunSummary, WriteupsError> {
    let total_start = Instant::now();

    // ── Step 1: Check inputs and capabilities ────────────────────────────
    // Nothing touches the file system until the browser is known to exist.
    let input_dir = discover::resolve_input_dir(input)?;
    let browser_config = engine::browser_config(config)?;
    let output_dir = create_output_dir(output_dir).await?;

    // ── Step 2: Discover ─────────────────────────────────────────────────
    let challenges = discover::discover(&input_dir, config)?;
    if challenges.is_empty() {
        warn!("No writeups found under {}", input_dir.display());
        return Ok(RunSummary::empty(input_dir, output_dir));
    }

    let merge = merge();

    // ── Step 3: Render ───────────────────────────────────────────────────
    let engine = ChromiumEngine::launch(browser_config).await?;
    let run = render_all(&engine, &challenges, &output_dir, config).await;
    engine.close().await;

    // ── Step 4: Merge ────────────────────────────────────────────────────
    Ok(finish(run, merge.as_ref(), input_dir, output_dir, config, total_start).await)
}

async fn create_output_dir(output_dir: &Path) -> Result<PathBuf, WriteupsError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| WriteupsError::OutputDirFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
    Ok(output_dir.to_path_buf())
}

/// Render the index, then every writeup in discovery order.
async fn render_all(
    engine: &dyn RenderEngine,
    challenges: &[Challenge],
    output_dir: &Path,
    config: &ConverterConfig,
) -> RenderRun {
    let start = Instant::now();
    let total = challenges.len();
    let cb = config.progress_callback.as_ref();

    if let Some(cb) = cb {
        cb.on_run_start(total);
    }

    let mut outputs = Vec::with_capacity(total + 1);
    let index_rendered = match index::render_index(engine, challenges, output_dir, config).await {
        Ok(output) => {
            outputs.push(output);
            true
        }
        Err(e) => {
            warn!("Index not rendered: {}", e);
            false
        }
    };

    let mut items = Vec::with_capacity(total);
    for (i, challenge) in challenges.iter().enumerate() {
        let position = i + 1;
        let label = challenge.label();
        if let Some(cb) = cb {
            cb.on_item_start(position, total, &label);
        }

        let item_start = Instant::now();
        let result = render::render_challenge(engine, challenge, output_dir, config).await;
        let duration_ms = item_start.elapsed().as_millis() as u64;

        let item = match result {
            Ok(output) => {
                if let Some(cb) = cb {
                    cb.on_item_complete(position, total, &label);
                }
                let path = output.path.clone();
                outputs.push(output);
                ItemResult {
                    category: challenge.category.clone(),
                    name: challenge.name.clone(),
                    output: Some(path),
                    duration_ms,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Failed {}", e);
                if let Some(cb) = cb {
                    cb.on_item_error(position, total, &label, &e.to_string());
                }
                ItemResult {
                    category: challenge.category.clone(),
                    name: challenge.name.clone(),
                    output: None,
                    duration_ms,
                    error: Some(e),
                }
            }
        };
        items.push(item);
    }

    let succeeded = items.iter().filter(|r| r.error.is_none()).count();
    if let Some(cb) = cb {
        cb.on_run_complete(total, succeeded);
    }
    info!("Rendered {}/{} writeups", succeeded, total);

    RenderRun {
        items,
        outputs,
        index_rendered,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Merge (when possible) and assemble the summary.
async fn finish(
    run: RenderRun,
    merge: Option<&MergeCapability>,
    input_dir: PathBuf,
    output_dir: PathBuf,
    config: &ConverterConfig,
    total_start: Instant,
) -> RunSummary {
    let merge_start = Instant::now();
    let dest = output_dir.join(&config.merged_file_name);
    let merge = merge_outputs(merge, &run.outputs, dest).await;
    let merge_duration_ms = merge_start.elapsed().as_millis() as u64;

    let succeeded = run.items.iter().filter(|r| r.error.is_none()).count();
    let stats = RunStats {
        items_found: run.items.len(),
        succeeded,
        failed: run.items.len() - succeeded,
        index_rendered: run.index_rendered,
        render_duration_ms: run.duration_ms,
        merge_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Run complete: {}/{} writeups, {}ms total",
        stats.succeeded, stats.items_found, stats.total_duration_ms
    );

    RunSummary {
        input_dir,
        output_dir,
        items: run.items,
        outputs: run.outputs,
        merge,
        stats,
    }
}

/// Concatenate `outputs` into `dest` on a blocking thread.
async fn merge_outputs(
    merge: Option<&MergeCapability>,
    outputs: &[RenderedOutput],
    dest: PathBuf,
) -> MergeStatus {
    let assembler = match merge {
        None => return MergeStatus::Disabled,
        Some(MergeCapability::Unavailable { reason }) => {
            return MergeStatus::Unavailable {
                reason: reason.clone(),
            }
        }
        Some(MergeCapability::Available(assembler)) => Arc::clone(assembler),
    };
    if outputs.is_empty() {
        return MergeStatus::NothingToMerge;
    }

    let outputs = outputs.to_vec();
    match tokio::task::spawn_blocking(move || assembler.assemble(&outputs, &dest)).await {
        Ok(Ok(report)) => MergeStatus::Merged(report),
        Ok(Err(e)) => {
            warn!("{}", e);
            MergeStatus::Failed {
                detail: e.to_string(),
            }
        }
        Err(e) => MergeStatus::Failed {
            detail: format!("Merge task panicked: {}", e),
        },
    }
}
