//! Error types for the edgequake-md2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExportError`] is **fatal**: the run cannot proceed at all (project root
//!   unreadable, output directory not creatable, no browser installed).
//!   Returned as `Err(ExportError)` from the top-level `export*` functions.
//!
//! * [`DocumentError`] is **non-fatal**: one document failed (unreadable file,
//!   browser crashed on it) but the others are fine. Stored inside
//!   [`crate::output::DocumentResult`] and counted in the run summary.
//!
//! A missing browser is fatal.

use browser_locate::LocateError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-md2pdf library.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The project root could not be listed.
    #[error("Cannot read project root '{path}': {source}")]
    ProjectRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No browser executable could be located.
    #[error("{0}")]
    BrowserNotFound(#[from] LocateError),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The Markdown source could not be read.
    #[error("{file}: failed to read Markdown: {detail}")]
    ReadFailed { file: String, detail: String },

    /// The intermediate HTML could not be written to the temp workspace.
    #[error("{file}: failed to write temporary HTML: {detail}")]
    WriteFailed { file: String, detail: String },

    /// The browser did not produce a PDF.
    #[error("{file}: {detail}")]
    PrintFailed { file: String, detail: String },
}

/// Failure of a single browser print invocation.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The browser process could not be started.
    #[error("failed to start browser '{browser}': {source}")]
    Spawn {
        browser: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The browser exited unsuccessfully. `reason` is its stderr, or the exit
    /// code when stderr was empty.
    #[error("{reason}")]
    Failed { reason: String },
}
