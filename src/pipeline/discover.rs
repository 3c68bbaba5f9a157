//! Source enumeration: eligible documents directly inside the project root.
//!
//! The scan is deliberately shallow. Only regular files sitting in the root
//! whose name ends in `.<extension>` are exported; subdirectories (and the
//! files inside them) are ignored, so the output directory never needs to
//! mirror a tree.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One eligible Markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// File name without the extension; names the output artifact.
    pub stem: String,
}

impl SourceDocument {
    /// File name as shown to the user, e.g. `notes.md`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stem.clone())
    }

    /// `<output_dir>/<stem>.pdf`
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.pdf", self.stem))
    }
}

/// Async form of [`list_documents`] for the export loop.
///
/// The directory scan runs on the blocking pool via `spawn_blocking`.
pub async fn scan_documents(
    root: &Path,
    extension: &str,
) -> Result<Vec<SourceDocument>, ExportError> {
    let root = root.to_path_buf();
    let extension = extension.to_string();

    tokio::task::spawn_blocking(move || list_documents(&root, &extension))
        .await
        .map_err(|e| ExportError::Internal(format!("Directory scan task panicked: {}", e)))?
}

/// List eligible documents in `root`, sorted by path.
pub fn list_documents(root: &Path, extension: &str) -> Result<Vec<SourceDocument>, ExportError> {
    let unreadable = |source| ExportError::ProjectRootUnreadable {
        path: root.to_path_buf(),
        source,
    };
    let suffix = format!(".{extension}");

    let mut docs = Vec::new();
    for entry in std::fs::read_dir(root).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        // Follows symlinks, like a stat() on the path.
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let stem = match name.strip_suffix(&suffix) {
            Some(stem) if !stem.is_empty() => stem,
            _ => continue,
        };
        docs.push(SourceDocument {
            stem: stem.to_string(),
            path,
        });
    }

    docs.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Found {} eligible documents in {}", docs.len(), root.display());
    Ok(docs)
}
