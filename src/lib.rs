//! # edgequake-md2pdf
//!
//! Export the Markdown documents of a project to styled, print-ready PDF
//! files using a headless Chromium-family browser.
//!
//! ## Why a browser?
//!
//! Project documentation leans on things a PDF library cannot lay out on its
//! own: GitHub-style tables, long code listings and Mermaid diagrams that
//! only exist once JavaScript has run. Chrome already renders all of that, and
//! its `--print-to-pdf` mode produces paginated A4 output from a plain HTML
//! file. This crate just prepares that file and drives the browser.
//!
//! ## Pipeline Overview
//!
//! ```text
//! project root
//!  │
//!  ├─ 1. Discover  *.md directly in the root, sorted
//!  ├─ 2. Compose   Markdown → HTML page (stylesheet, Mermaid, readiness script)
//!  ├─ 3. Locate    browser via --browser / PUPPETEER_EXECUTABLE_PATH / CHROME_PATH / install paths
//!  ├─ 4. Print     chrome --headless=new --print-to-pdf=<out>/<stem>.pdf file://<tmp>.html
//!  └─ 5. Cleanup   optional kill_chrome.sh once the run is over
//! ```
//!
//! Documents are exported one at a time. A document that fails is counted and
//! skipped; a missing browser stops the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2pdf::{export, ExportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::builder().project_root(".").build()?;
//!     let report = export(&config).await?;
//!     eprintln!(
//!         "{} ok / {} failed → {}",
//!         report.stats.succeeded,
//!         report.stats.failed,
//!         report.output_dir.display()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-md2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use browser_locate::{BrowserLocator, Located};
pub use config::{ComposeOptions, ExportConfig, ExportConfigBuilder};
pub use error::{DocumentError, ExportError, PrintError};
pub use export::{export, export_sync, plan};
pub use output::{DocumentResult, ExportReport, ExportStats};
pub use pipeline::cleanup::CleanupOutcome;
pub use pipeline::compose::{compose_html, ComposedHtml};
pub use pipeline::discover::SourceDocument;
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{export_stream, DocumentStream};
