//! Result types returned by the export entry points.

use crate::error::{DocumentError, ExportError};
use crate::pipeline::cleanup::CleanupOutcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of exporting one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// 1-based position in the sorted document list.
    pub index: usize,
    pub source: PathBuf,
    /// Target PDF path (written only when `error` is `None`).
    pub output: PathBuf,
    /// Size of the composed HTML in bytes; 0 if the source could not be read.
    pub html_bytes: usize,
    /// Number of diagram containers in the composed page.
    pub diagrams: usize,
    pub duration_ms: u64,
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counters for a run. `succeeded + failed == total` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

impl ExportStats {
    pub fn from_results(documents: &[DocumentResult], total_duration_ms: u64) -> Self {
        let succeeded = documents.iter().filter(|d| d.is_success()).count();
        Self {
            total: documents.len(),
            succeeded,
            failed: documents.len() - succeeded,
            total_duration_ms,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    pub documents: Vec<DocumentResult>,
    pub stats: ExportStats,
    pub cleanup: CleanupOutcome,
}

impl ExportReport {
    /// `true` when the project root held no eligible documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Turn any per-document failure into an error, for callers that want
    /// all-or-nothing semantics.
    pub fn into_result(self) -> Result<Self, ExportError> {
        if self.stats.failed == 0 {
            return Ok(self);
        }
        let first = self
            .documents
            .iter()
            .find_map(|d| d.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_default();
        Err(ExportError::Internal(format!(
            "{}/{} documents failed; first error: {}",
            self.stats.failed, self.stats.total, first
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, error: Option<DocumentError>) -> DocumentResult {
        DocumentResult {
            index,
            source: PathBuf::from(format!("doc{index}.md")),
            output: PathBuf::from(format!("pdf_output/doc{index}.pdf")),
            html_bytes: 10,
            diagrams: 0,
            duration_ms: 1,
            error,
        }
    }

    #[test]
    fn stats_counts_add_up() {
        let docs = vec![
            result(1, None),
            result(
                2,
                Some(DocumentError::PrintFailed {
                    file: "doc2.md".into(),
                    detail: "x".into(),
                }),
            ),
            result(3, None),
        ];
        let stats = ExportStats::from_results(&docs, 42);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.succeeded + stats.failed, stats.total);
    }

    #[test]
    fn into_result_reports_first_failure() {
        let docs = vec![
            result(1, None),
            result(
                2,
                Some(DocumentError::ReadFailed {
                    file: "doc2.md".into(),
                    detail: "permission denied".into(),
                }),
            ),
        ];
        let report = ExportReport {
            output_dir: PathBuf::from("pdf_output"),
            stats: ExportStats::from_results(&docs, 0),
            documents: docs,
            cleanup: CleanupOutcome::Disabled,
        };
        let err = report.into_result().unwrap_err().to_string();
        assert!(err.contains("1/2"), "got: {err}");
        assert!(err.contains("permission denied"), "got: {err}");
    }

    #[test]
    fn report_serialises_to_json() {
        let docs = vec![result(1, None)];
        let report = ExportReport {
            output_dir: PathBuf::from("pdf_output"),
            stats: ExportStats::from_results(&docs, 5),
            documents: docs,
            cleanup: CleanupOutcome::Skipped,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["succeeded"], 1);
        assert_eq!(json["documents"][0]["output"], "pdf_output/doc1.pdf");
    }
}
