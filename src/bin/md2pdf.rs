//! CLI binary for edgequake-md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExportConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2pdf::{
    export, plan, CleanupOutcome, ComposeOptions, ExportConfig, ExportProgressCallback,
    ExportReport, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const RULE: &str = "═══════════════════════════════════════════════════════════";

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar anchored at the bottom of the terminal
/// plus one log line per finished document.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time and file name of the document in flight.
    current: Mutex<Option<(Instant, String)>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_export_start
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} docs  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Exporting");
        Arc::new(Self {
            bar,
            current: Mutex::new(None),
        })
    }

    fn finish_current(&self) -> (String, f64) {
        self.current
            .lock()
            .ok()
            .and_then(|mut c| c.take())
            .map(|(t, name)| (name, t.elapsed().as_secs_f64()))
            .unwrap_or_default()
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(80));
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting headless export of {total} document(s)…"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, name: &str) {
        if let Ok(mut c) = self.current.lock() {
            *c = Some((Instant::now(), name.to_string()));
        }
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, output: &Path) {
        let (name, secs) = self.finish_current();
        let pdf = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {} → {}  {}",
            green("✓"),
            index,
            total,
            name,
            pdf,
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let (_, secs) = self.finish_current();
        // Browser stderr can be long; keep the first line only.
        let first = error.lines().next().unwrap_or(error);
        let msg = if first.chars().count() > 100 {
            format!("{}\u{2026}", first.chars().take(99).collect::<String>())
        } else {
            first.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3} {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_export_complete(&self, _total: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export every *.md in the current directory to ./pdf_output
  md2pdf

  # Another project, custom output directory
  md2pdf ~/work/handbook -o ~/Desktop/handbook-pdf

  # Show which files would be exported, then stop
  md2pdf --list

  # Pin the browser and give slow diagrams more time
  md2pdf --browser /usr/bin/chromium --virtual-time-budget 60000 --diagram-timeout 20000

  # Machine-readable report; fail the build if any document failed
  md2pdf --json --strict > report.json

BROWSER LOOKUP (first existing wins):
  1. --browser / MD2PDF_BROWSER
  2. PUPPETEER_EXECUTABLE_PATH
  3. CHROME_PATH
  4. Conventional install paths (Google Chrome, Chromium, Microsoft Edge)
  5. google-chrome, chromium, chromium-browser, microsoft-edge on PATH

ENVIRONMENT VARIABLES:
  PUPPETEER_EXECUTABLE_PATH  Browser executable override
  CHROME_PATH                Secondary browser executable override
  RUST_LOG                   Log filter (e.g. edgequake_md2pdf=debug)

DIAGRAMS:
  Fenced ```mermaid blocks are rendered by Mermaid loaded from a CDN. Without
  network access the diagrams stay empty but the PDF is still produced once
  --diagram-timeout expires.
"#;

/// Export the Markdown documents of a project to PDF via headless Chrome.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Export Markdown documents to PDF via headless Chrome",
    long_about = "Render every Markdown file in a project root to styled HTML (tables, code, \
Mermaid diagrams) and print it to PDF with a headless Chrome, Chromium or Edge browser.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Project root scanned (non-recursively) for Markdown files.
    #[arg(env = "MD2PDF_ROOT", default_value = ".")]
    root: PathBuf,

    /// Output directory; relative paths are resolved against the project root.
    #[arg(short, long, env = "MD2PDF_OUTPUT_DIR", default_value = "pdf_output")]
    output_dir: PathBuf,

    /// File extension of eligible documents.
    #[arg(long, env = "MD2PDF_EXTENSION", default_value = "md")]
    extension: String,

    /// Browser executable, tried before every other location.
    #[arg(long, env = "MD2PDF_BROWSER")]
    browser: Option<PathBuf>,

    /// Browser virtual time budget in milliseconds.
    #[arg(long, env = "MD2PDF_VIRTUAL_TIME_BUDGET", default_value_t = 30_000,
          value_parser = clap::value_parser!(u64).range(1_000..=600_000))]
    virtual_time_budget: u64,

    /// Extra browser flag (repeatable), e.g. --browser-arg=--no-sandbox.
    #[arg(long = "browser-arg", value_name = "FLAG", allow_hyphen_values = true)]
    browser_args: Vec<String>,

    /// Per-diagram render deadline in milliseconds.
    #[arg(long, env = "MD2PDF_DIAGRAM_TIMEOUT", default_value_t = 10_000)]
    diagram_timeout: u64,

    /// Diagram render poll interval in milliseconds.
    #[arg(long, env = "MD2PDF_POLL_INTERVAL", default_value_t = 100,
          value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,

    /// Mermaid script URL.
    #[arg(long, env = "MD2PDF_MERMAID_URL")]
    mermaid_url: Option<String>,

    /// Mermaid theme (default, neutral, dark, forest).
    #[arg(long, env = "MD2PDF_THEME", default_value = "default")]
    theme: String,

    /// `lang` attribute of the generated pages.
    #[arg(long, env = "MD2PDF_LANG", default_value = "en")]
    lang: String,

    /// CSS file replacing the built-in print stylesheet.
    #[arg(long, env = "MD2PDF_STYLESHEET")]
    stylesheet: Option<PathBuf>,

    /// Helper script run after the export; relative to the project root.
    #[arg(long, env = "MD2PDF_CLEANUP_SCRIPT", default_value = "kill_chrome.sh")]
    cleanup_script: PathBuf,

    /// Do not run the helper script.
    #[arg(long, env = "MD2PDF_NO_CLEANUP")]
    no_cleanup: bool,

    /// List the documents that would be exported and exit.
    #[arg(long)]
    list: bool,

    /// Print the ExportReport as JSON on stdout.
    #[arg(long, env = "MD2PDF_JSON")]
    json: bool,

    /// Exit with status 2 when any document failed.
    #[arg(long, env = "MD2PDF_STRICT")]
    strict: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar already reports every document.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n{} {:#}", red("✗ Fatal error:"), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<ExitCode> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress_cb).await?;

    // ── File list ────────────────────────────────────────────────────────
    let planned = plan(&config).context("Failed to list documents")?;
    if planned.is_empty() {
        if cli.json {
            let report = export(&config).await.context("Export failed")?;
            print_json(&report)?;
        } else if !cli.quiet {
            eprintln!(
                "No Markdown files found in {}.",
                bold(&config.project_root.display().to_string())
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.quiet && !cli.json {
        eprintln!("\n{RULE}");
        eprintln!("  Documents to export:");
        eprintln!("{RULE}\n");
        for (i, (doc, out)) in planned.iter().enumerate() {
            let pdf = out
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            eprintln!("  {}. {} → {}", i + 1, doc.file_name(), pdf);
        }
        eprintln!("\n{RULE}\n");
        eprintln!("Total: {} Markdown document(s).", planned.len());
        eprintln!(
            "Output directory: {}\n",
            config.output_path().display()
        );
    }

    if cli.list {
        return Ok(ExitCode::SUCCESS);
    }

    // ── Run export ───────────────────────────────────────────────────────
    let report = export(&config).await.context("Export aborted")?;

    if cli.json {
        print_json(&report)?;
    } else if !cli.quiet {
        print_summary(&report);
    }

    if cli.strict && report.stats.failed > 0 {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json(report: &ExportReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
    println!("{json}");
    Ok(())
}

fn print_summary(report: &ExportReport) {
    let stats = &report.stats;
    eprintln!("\n{RULE}");
    eprintln!("  Export summary");
    eprintln!("{RULE}");
    eprintln!("  {} Succeeded: {} document(s)", green("✓"), stats.succeeded);
    if stats.failed > 0 {
        eprintln!("  {} Failed:    {} document(s)", red("✗"), stats.failed);
    }
    eprintln!("  Total:       {} document(s)", stats.total);
    eprintln!("  PDFs saved to: {}", bold(&report.output_dir.display().to_string()));
    eprintln!("  {}", dim(&format!("{}ms", stats.total_duration_ms)));
    eprintln!("{RULE}\n");

    match &report.cleanup {
        CleanupOutcome::Disabled => {}
        CleanupOutcome::Skipped => {
            eprintln!("  {}  Cleanup script not found. Skipping…", yellow("⚠"));
        }
        CleanupOutcome::Ran { stdout } => {
            if !stdout.trim().is_empty() {
                eprintln!("{}", stdout.trim_end());
            }
        }
        CleanupOutcome::Failed { reason } => {
            eprintln!("  {}  Cleanup script failed: {}", yellow("⚠"), reason);
        }
    }
}

/// Map CLI args to `ExportConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExportConfig> {
    let stylesheet = if let Some(ref path) = cli.stylesheet {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read stylesheet from {:?}", path))?,
        )
    } else {
        None
    };

    let mut compose = ComposeOptions {
        diagram_theme: cli.theme.clone(),
        lang: cli.lang.clone(),
        poll_interval_ms: cli.poll_interval,
        render_timeout_ms: cli.diagram_timeout,
        stylesheet,
        ..ComposeOptions::default()
    };
    if let Some(ref url) = cli.mermaid_url {
        compose.diagram_library_url = url.clone();
    }

    let mut builder = ExportConfig::builder()
        .project_root(&cli.root)
        .output_dir(&cli.output_dir)
        .extension(&cli.extension)
        .virtual_time_budget_ms(cli.virtual_time_budget)
        .compose(compose)
        .cleanup_script((!cli.no_cleanup).then(|| cli.cleanup_script.clone()));

    if let Some(ref browser) = cli.browser {
        builder = builder.browser(browser);
    }
    for arg in &cli.browser_args {
        builder = builder.extra_browser_arg(arg);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
