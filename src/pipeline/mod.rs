//! Pipeline stages for Markdown-to-PDF export.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the orchestrator in [`crate::export`] stays a plain loop.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ compose ──▶ (temp .html) ──▶ print ──▶ <stem>.pdf
//! (root scan)  (md → page)                  (headless browser)
//!                                              ... then cleanup once per run
//! ```
//!
//! 1. [`discover`]: list eligible documents in the project root, sorted
//! 2. [`compose`]: Markdown to a full HTML page with the [`style`] sheet,
//!    diagram containers and the readiness script
//! 3. [`print`]: one `--print-to-pdf` browser invocation per document
//! 4. [`cleanup`]: optional helper script after the last document

pub mod cleanup;
pub mod compose;
pub mod discover;
pub mod print;
pub mod style;
