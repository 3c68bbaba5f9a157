//! Streaming export API: emit each document's result as it finishes.
//!
//! Unlike the eager [`crate::export::export`], which returns only after the
//! last document, [`export_stream`] yields a [`DocumentResult`] per document.
//! Documents are still processed one at a time and in sorted order.
//!
//! A missing browser is yielded as an `Err` item; callers that keep polling
//! after it will see the same error for each remaining document. The
//! progress callback gets `on_export_complete` once the last item has been
//! yielded, so a stream dropped early never reports completion. The post-run
//! helper script is not run by the stream.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::export::{export_document, prepare_output_dir};
use crate::output::DocumentResult;
use crate::pipeline::discover;
use futures::future;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<DocumentResult, ExportError>> + Send>>;

/// Export documents, streaming results as each one completes.
///
/// # Returns
/// - `Ok(DocumentStream)`: one item per eligible document (empty when none)
/// - `Err(ExportError)`: project root unreadable or output dir not creatable
///
/// # Example
/// ```rust,no_run
/// use edgequake_md2pdf::{export_stream, ExportConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExportConfig::builder().project_root("docs").build()?;
/// let mut results = export_stream(&config).await?;
/// while let Some(item) = results.next().await {
///     match item? {
///         doc if doc.is_success() => println!("✓ {}", doc.output.display()),
///         doc => eprintln!("✗ {}", doc.error.map(|e| e.to_string()).unwrap_or_default()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn export_stream(config: &ExportConfig) -> Result<DocumentStream, ExportError> {
    let docs = discover::scan_documents(&config.project_root, &config.extension).await?;
    if docs.is_empty() {
        info!(
            "No Markdown files found in {}",
            config.project_root.display()
        );
        return Ok(Box::pin(stream::empty()));
    }

    let output_dir = prepare_output_dir(&config.output_path()).await?;
    let total = docs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_export_start(total);
    }

    let locator = config.browser_locator();
    let succeeded = Arc::new(AtomicUsize::new(0));
    let callback = config.progress_callback.clone();
    let config = config.clone();

    let counter = succeeded.clone();
    let documents = stream::iter(docs.into_iter().enumerate()).then(move |(i, doc)| {
        let locator = locator.clone();
        let config = config.clone();
        let output_dir = output_dir.clone();
        let counter = counter.clone();
        async move {
            let result = export_document(&doc, i + 1, total, &output_dir, &locator, &config).await;
            if matches!(result, Ok(ref r) if r.is_success()) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            result
        }
    });

    // Yields nothing; only reports completion once `documents` is exhausted.
    let complete = stream::once(async move {
        let ok = succeeded.load(Ordering::SeqCst);
        info!("Stream complete: {}/{} succeeded", ok, total);
        if let Some(cb) = callback {
            cb.on_export_complete(total, ok);
        }
    })
    .filter_map(|()| future::ready(None::<Result<DocumentResult, ExportError>>));

    Ok(Box::pin(documents.chain(complete)))
}
