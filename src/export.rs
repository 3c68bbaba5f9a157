//! Eager (whole-run) export entry points.
//!
//! [`export`] walks every eligible document strictly one at a time, in sorted
//! order. Each document spawns its own browser process.
//!
//! Failure handling follows the two error types in [`crate::error`]: a
//! document that cannot be read or printed becomes a failed
//! [`DocumentResult`] and the loop moves on, while a missing browser aborts
//! the run because every remaining document would fail the same way.

use crate::config::ExportConfig;
use crate::error::{DocumentError, ExportError};
use crate::output::{DocumentResult, ExportReport, ExportStats};
use crate::pipeline::cleanup::{self, CleanupOutcome};
use crate::pipeline::compose::compose_html;
use crate::pipeline::discover::{self, SourceDocument};
use crate::pipeline::print::{self, PrintJob};
use browser_locate::BrowserLocator;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Name prefix of the per-document temporary directory.
pub const TEMP_PREFIX: &str = "md2pdf-export-";

/// Export every eligible document under `config.project_root`.
///
/// # Returns
/// `Ok(ExportReport)` once every document has been attempted, even if some
/// failed (check `report.stats.failed`). With no eligible documents the
/// report is empty, the output directory is not created and no browser is
/// looked up.
///
/// # Errors
/// Returns `Err(ExportError)` only for fatal errors:
/// - project root unreadable
/// - output directory cannot be created
/// - no browser executable found
pub async fn export(config: &ExportConfig) -> Result<ExportReport, ExportError> {
    let total_start = Instant::now();
    let output_dir = config.output_path();

    // ── Step 1: Enumerate ────────────────────────────────────────────────
    let docs = discover::scan_documents(&config.project_root, &config.extension).await?;
    if docs.is_empty() {
        info!(
            "No Markdown files found in {}",
            config.project_root.display()
        );
        return Ok(ExportReport {
            output_dir,
            documents: Vec::new(),
            stats: ExportStats::default(),
            cleanup: CleanupOutcome::Disabled,
        });
    }

    let total = docs.len();
    info!(
        "Exporting {} document(s) to {}",
        total,
        output_dir.display()
    );

    // ── Step 2: Output directory ─────────────────────────────────────────
    let output_dir = prepare_output_dir(&output_dir).await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_start(total);
    }

    // ── Step 3: One document at a time ───────────────────────────────────
    let locator = config.browser_locator();
    let mut documents = Vec::with_capacity(total);
    for (i, doc) in docs.iter().enumerate() {
        let result = export_document(doc, i + 1, total, &output_dir, &locator, config).await?;
        documents.push(result);
    }

    // ── Step 4: Summary ──────────────────────────────────────────────────
    let stats = ExportStats::from_results(&documents, total_start.elapsed().as_millis() as u64);
    info!(
        "Export complete: {}/{} succeeded, {} failed, {}ms",
        stats.succeeded, stats.total, stats.failed, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_export_complete(stats.total, stats.succeeded);
    }

    // ── Step 5: Best-effort helper script ────────────────────────────────
    let cleanup = match config.cleanup_script_path() {
        Some(script) => cleanup::run_cleanup(&script).await,
        None => CleanupOutcome::Disabled,
    };

    Ok(ExportReport {
        output_dir,
        documents,
        stats,
        cleanup,
    })
}

/// Synchronous wrapper around [`export`].
///
/// Creates a temporary tokio runtime internally.
pub fn export_sync(config: &ExportConfig) -> Result<ExportReport, ExportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(export(config))
}

/// List what [`export`] would do: each eligible document and its target PDF.
///
/// Touches neither the output directory nor the browser.
pub fn plan(config: &ExportConfig) -> Result<Vec<(SourceDocument, PathBuf)>, ExportError> {
    let output_dir = config.output_path();
    let docs = discover::list_documents(&config.project_root, &config.extension)?;
    Ok(docs
        .into_iter()
        .map(|d| {
            let out = d.output_path(&output_dir);
            (d, out)
        })
        .collect())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Create the output directory and return it as an absolute path, since the
/// browser resolves `--print-to-pdf` against its own working directory.
pub(crate) async fn prepare_output_dir(dir: &Path) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::OutputDirFailed {
            path: dir.to_path_buf(),
            source,
        })?;
    Ok(std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()))
}

/// Export one document.
///
/// Returns `Ok` with a failed [`DocumentResult`] for per-document problems;
/// `Err` only when no browser can be located.
pub(crate) async fn export_document(
    doc: &SourceDocument,
    index: usize,
    total: usize,
    output_dir: &Path,
    locator: &BrowserLocator,
    config: &ExportConfig,
) -> Result<DocumentResult, ExportError> {
    let start = Instant::now();
    let file = doc.file_name();
    let output = doc.output_path(output_dir);
    info!("Processing {} ({}/{})", file, index, total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(index, total, &file);
    }

    let mut result = DocumentResult {
        index,
        source: doc.path.clone(),
        output: output.clone(),
        html_bytes: 0,
        diagrams: 0,
        duration_ms: 0,
        error: None,
    };

    let outcome = render_document(doc, &file, &output, locator, config, &mut result).await?;
    result.duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            info!("Generated {}", output.display());
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_complete(index, total, &output);
            }
        }
        Err(e) => {
            warn!("Failed to export {}: {}", file, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_error(index, total, &e.to_string());
            }
            result.error = Some(e);
        }
    }

    Ok(result)
}

/// The fallible body of [`export_document`]. The outer `Result` is fatal, the
/// inner one is the document's own outcome.
async fn render_document(
    doc: &SourceDocument,
    file: &str,
    output: &Path,
    locator: &BrowserLocator,
    config: &ExportConfig,
    result: &mut DocumentResult,
) -> Result<Result<(), DocumentError>, ExportError> {
    // Invalid UTF-8 (e.g. Latin-1 sources) is replaced with U+FFFD, not rejected.
    let markdown = match tokio::fs::read(&doc.path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            return Ok(Err(DocumentError::ReadFailed {
                file: file.to_string(),
                detail: e.to_string(),
            }))
        }
    };

    let composed = compose_html(&markdown, &doc.stem, &config.compose);
    result.html_bytes = composed.html.len();
    result.diagrams = composed.diagrams;

    let browser = locator.require()?;
    debug!(
        "Using browser {} (via {})",
        browser.path.display(),
        browser.strategy
    );

    let write_failed = |e: std::io::Error| DocumentError::WriteFailed {
        file: file.to_string(),
        detail: e.to_string(),
    };
    let workspace = match tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir() {
        Ok(dir) => dir,
        Err(e) => return Ok(Err(write_failed(e))),
    };
    let html_path = workspace.path().join(format!("{}.html", doc.stem));
    if let Err(e) = tokio::fs::write(&html_path, &composed.html).await {
        return Ok(Err(write_failed(e)));
    }
    debug!("Wrote {} ({} bytes)", html_path.display(), composed.html.len());

    let printed = print::print_to_pdf(&PrintJob {
        browser: &browser.path,
        html: &html_path,
        pdf: output,
        virtual_time_budget_ms: config.virtual_time_budget_ms,
        extra_args: &config.extra_browser_args,
    })
    .await;

    if let Err(e) = workspace.close() {
        debug!("Ignoring temp cleanup failure: {}", e);
    }

    Ok(printed.map_err(|e| DocumentError::PrintFailed {
        file: file.to_string(),
        detail: e.to_string(),
    }))
}
