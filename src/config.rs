//! Configuration types for Markdown-to-PDF export.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. HTML composition knobs live in the nested
//! [`ComposeOptions`] so the composer can be used on its own.

use crate::error::ExportError;
use crate::progress::ProgressCallback;
use browser_locate::{BrowserLocator, ExplicitPath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default CDN location of the Mermaid diagram library.
pub const DEFAULT_DIAGRAM_LIBRARY_URL: &str =
    "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

/// Default name of the optional post-run helper script in the project root.
pub const DEFAULT_CLEANUP_SCRIPT: &str = "kill_chrome.sh";

/// Default output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "pdf_output";

/// Configuration for an export run.
///
/// Built via [`ExportConfig::builder()`] or using [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .project_root("docs")
///     .output_dir("build/pdf")
///     .virtual_time_budget_ms(45_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Directory scanned (non-recursively) for source documents. Default: `.`.
    pub project_root: PathBuf,

    /// Where PDFs are written. Relative paths are joined to `project_root`.
    /// Default: `pdf_output`.
    pub output_dir: PathBuf,

    /// File-name suffix of eligible documents, without the dot. Default: `md`.
    pub extension: String,

    /// Explicit browser executable, tried before every other location.
    pub browser: Option<PathBuf>,

    /// Pre-built locator. Takes precedence over `browser` and the default chain.
    pub locator: Option<Arc<BrowserLocator>>,

    /// `--virtual-time-budget` passed to the browser, in ms. Default: 30000.
    ///
    /// Headless Chrome fast-forwards timers inside this budget, which is what
    /// lets the in-page diagram poll finish before the page is printed.
    pub virtual_time_budget_ms: u64,

    /// Extra flags appended after the built-in print flags.
    pub extra_browser_args: Vec<String>,

    /// HTML composition options.
    pub compose: ComposeOptions,

    /// Post-run helper script. Relative paths are joined to `project_root`.
    /// `None` disables the step. Default: `kill_chrome.sh`.
    pub cleanup_script: Option<PathBuf>,

    /// Per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            extension: "md".to_string(),
            browser: None,
            locator: None,
            virtual_time_budget_ms: 30_000,
            extra_browser_args: Vec::new(),
            compose: ComposeOptions::default(),
            cleanup_script: Some(PathBuf::from(DEFAULT_CLEANUP_SCRIPT)),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("project_root", &self.project_root)
            .field("output_dir", &self.output_dir)
            .field("extension", &self.extension)
            .field("browser", &self.browser)
            .field("locator", &self.locator)
            .field("virtual_time_budget_ms", &self.virtual_time_budget_ms)
            .field("extra_browser_args", &self.extra_browser_args)
            .field("compose", &self.compose)
            .field("cleanup_script", &self.cleanup_script)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Absolute-or-root-relative output directory.
    pub fn output_path(&self) -> PathBuf {
        under_root(&self.project_root, &self.output_dir)
    }

    /// Resolved helper script path, if the step is enabled.
    pub fn cleanup_script_path(&self) -> Option<PathBuf> {
        self.cleanup_script
            .as_ref()
            .map(|p| under_root(&self.project_root, p))
    }

    /// The locator used for every document, from most to least specific:
    /// a pre-built locator, else the explicit `browser` path followed by the
    /// system chain, else the system chain alone.
    pub fn browser_locator(&self) -> BrowserLocator {
        if let Some(ref locator) = self.locator {
            return BrowserLocator::clone(locator);
        }
        match self.browser {
            Some(ref path) => BrowserLocator::new()
                .with(ExplicitPath::new(path))
                .extend(BrowserLocator::system()),
            None => BrowserLocator::system(),
        }
    }
}

fn under_root(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.project_root = root.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Accepts `md` or `.md`.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        let ext: String = ext.into();
        self.config.extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn browser(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser = Some(path.into());
        self
    }

    pub fn locator(mut self, locator: BrowserLocator) -> Self {
        self.config.locator = Some(Arc::new(locator));
        self
    }

    pub fn virtual_time_budget_ms(mut self, ms: u64) -> Self {
        self.config.virtual_time_budget_ms = ms;
        self
    }

    pub fn extra_browser_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_browser_args.push(arg.into());
        self
    }

    pub fn compose(mut self, options: ComposeOptions) -> Self {
        self.config.compose = options;
        self
    }

    pub fn cleanup_script(mut self, script: Option<PathBuf>) -> Self {
        self.config.cleanup_script = script;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.extension.is_empty() {
            return Err(ExportError::InvalidConfig(
                "Document extension must not be empty".into(),
            ));
        }
        if !(1_000..=600_000).contains(&c.virtual_time_budget_ms) {
            return Err(ExportError::InvalidConfig(format!(
                "Virtual time budget must be 1000–600000 ms, got {}",
                c.virtual_time_budget_ms
            )));
        }
        c.compose.validate()?;
        Ok(self.config)
    }
}

// ── HTML composition ─────────────────────────────────────────────────────

/// Knobs for [`crate::pipeline::compose::compose_html`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// `<script src>` of the diagram library.
    pub diagram_library_url: String,

    /// Mermaid theme name. Default: `default`.
    pub diagram_theme: String,

    /// `<html lang>` attribute. Default: `en`.
    pub lang: String,

    /// How often each diagram container is checked for rendered output. Default: 100.
    pub poll_interval_ms: u64,

    /// Per-diagram deadline after which it is counted as done anyway. Default: 10000.
    ///
    /// Keeps one broken diagram (or an offline CDN) from blocking readiness
    /// for the whole document.
    pub render_timeout_ms: u64,

    /// Delay between the last diagram rendering and the readiness flag. Default: 500.
    pub settle_delay_ms: u64,

    /// Replacement stylesheet. `None` uses [`crate::pipeline::style::PDF_CSS`].
    pub stylesheet: Option<String>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            diagram_library_url: DEFAULT_DIAGRAM_LIBRARY_URL.to_string(),
            diagram_theme: "default".to_string(),
            lang: "en".to_string(),
            poll_interval_ms: 100,
            render_timeout_ms: 10_000,
            settle_delay_ms: 500,
            stylesheet: None,
        }
    }
}

impl ComposeOptions {
    fn validate(&self) -> Result<(), ExportError> {
        if self.poll_interval_ms == 0 {
            return Err(ExportError::InvalidConfig(
                "Diagram poll interval must be ≥ 1 ms".into(),
            ));
        }
        if self.render_timeout_ms < self.poll_interval_ms {
            return Err(ExportError::InvalidConfig(format!(
                "Diagram render timeout ({} ms) must not be shorter than the poll interval ({} ms)",
                self.render_timeout_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }
}
