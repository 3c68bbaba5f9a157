//! PDF printing: one headless browser invocation per document.
//!
//! The browser is driven entirely through its command line
//! (`--print-to-pdf`), not a DevTools session. Success is the exit status and
//! nothing else; on failure the captured stderr becomes the reason, falling
//! back to the exit code when the browser printed nothing.

use crate::error::PrintError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Everything needed to run one print job.
#[derive(Debug, Clone)]
pub struct PrintJob<'a> {
    pub browser: &'a Path,
    pub html: &'a Path,
    pub pdf: &'a Path,
    pub virtual_time_budget_ms: u64,
    pub extra_args: &'a [String],
}

/// Build the browser argument list for `job`, in invocation order.
pub fn print_args(job: &PrintJob<'_>) -> Vec<String> {
    let mut args = vec![
        "--headless=new".to_string(),
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--allow-file-access-from-files".to_string(),
        format!("--virtual-time-budget={}", job.virtual_time_budget_ms),
        "--print-to-pdf-no-header".to_string(),
        format!("--print-to-pdf={}", job.pdf.display()),
    ];
    args.extend(job.extra_args.iter().cloned());
    args.push(file_url(job.html));
    args
}

/// `file://` URL for a local path. Relative paths are made absolute against
/// the current directory; spaces and `#`/`?`/`%` are percent-encoded.
pub fn file_url(path: &Path) -> String {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let raw = absolute.to_string_lossy().replace('\\', "/");
    let mut url = String::from("file://");
    if !raw.starts_with('/') {
        // Windows drive paths: file:///C:/...
        url.push('/');
    }
    for c in raw.chars() {
        match c {
            '%' => url.push_str("%25"),
            ' ' => url.push_str("%20"),
            '#' => url.push_str("%23"),
            '?' => url.push_str("%3F"),
            c => url.push(c),
        }
    }
    url
}

/// Run the browser for `job` and wait for it to exit.
///
/// One invocation, no retry, no timeout beyond the browser's own virtual
/// time budget.
pub async fn print_to_pdf(job: &PrintJob<'_>) -> Result<(), PrintError> {
    let args = print_args(job);
    debug!("Invoking {} {:?}", job.browser.display(), args);

    let output = Command::new(job.browser)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| PrintError::Spawn {
            browser: job.browser.to_path_buf(),
            source,
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let reason = if !stderr.is_empty() {
        stderr.to_string()
    } else {
        match output.status.code() {
            Some(code) => format!("browser exit code {code}"),
            None => "browser terminated by signal".to_string(),
        }
    };
    Err(PrintError::Failed { reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job<'a>(browser: &'a Path, html: &'a Path, pdf: &'a Path, extra: &'a [String]) -> PrintJob<'a> {
        PrintJob {
            browser,
            html,
            pdf,
            virtual_time_budget_ms: 30_000,
            extra_args: extra,
        }
    }

    #[test]
    fn argument_order_and_flags() {
        let extra = vec!["--no-sandbox".to_string()];
        let args = print_args(&job(
            Path::new("/usr/bin/chromium"),
            Path::new("/tmp/x/notes.html"),
            Path::new("/out/notes.pdf"),
            &extra,
        ));
        assert_eq!(
            args,
            vec![
                "--headless=new",
                "--disable-gpu",
                "--no-first-run",
                "--no-default-browser-check",
                "--allow-file-access-from-files",
                "--virtual-time-budget=30000",
                "--print-to-pdf-no-header",
                "--print-to-pdf=/out/notes.pdf",
                "--no-sandbox",
                "file:///tmp/x/notes.html",
            ]
        );
    }

    #[test]
    fn file_url_escapes_reserved_characters() {
        assert_eq!(
            file_url(Path::new("/tmp/my docs/#1?.html")),
            "file:///tmp/my%20docs/%231%3F.html"
        );
        assert_eq!(file_url(Path::new("/tmp/100%.html")), "file:///tmp/100%25.html");
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = file_url(Path::new("page.html"));
        assert!(url.starts_with("file:///"), "got: {url}");
        assert!(url.ends_with("/page.html"), "got: {url}");
    }

    #[tokio::test]
    async fn missing_browser_is_a_spawn_error() {
        let err = print_to_pdf(&job(
            Path::new("/definitely/not/a/browser"),
            Path::new("/tmp/a.html"),
            Path::new("/tmp/a.pdf"),
            &[],
        ))
        .await
        .unwrap_err();
        assert!(matches!(err, PrintError::Spawn { .. }), "got: {err:?}");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let p = dir.join("fake-browser");
            std::fs::write(&p, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o755)).unwrap();
            p
        }

        #[tokio::test]
        async fn zero_exit_is_success() {
            let dir = tempfile::tempdir().unwrap();
            let browser = script(dir.path(), "echo noise >&2\nexit 0");
            let html = dir.path().join("a.html");
            let pdf = dir.path().join("a.pdf");
            print_to_pdf(&job(&browser, &html, &pdf, &[])).await.unwrap();
        }

        #[tokio::test]
        async fn nonzero_exit_reports_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let browser = script(dir.path(), "echo 'GPU process crashed' >&2\nexit 3");
            let html = dir.path().join("a.html");
            let pdf = dir.path().join("a.pdf");
            let err = print_to_pdf(&job(&browser, &html, &pdf, &[]))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "GPU process crashed");
        }

        #[tokio::test]
        async fn nonzero_exit_without_stderr_reports_code() {
            let dir = tempfile::tempdir().unwrap();
            let browser = script(dir.path(), "exit 21");
            let html = dir.path().join("a.html");
            let pdf = dir.path().join("a.pdf");
            let err = print_to_pdf(&job(&browser, &html, &pdf, &[]))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "browser exit code 21");
        }

        #[tokio::test]
        async fn browser_receives_print_flags() {
            let dir = tempfile::tempdir().unwrap();
            let log = dir.path().join("args.log");
            let browser = script(
                dir.path(),
                &format!("for a in \"$@\"; do echo \"$a\" >> '{}'; done", log.display()),
            );
            let html = dir.path().join("a.html");
            let pdf = dir.path().join("a.pdf");
            print_to_pdf(&job(&browser, &html, &pdf, &[])).await.unwrap();

            let logged = std::fs::read_to_string(&log).unwrap();
            assert!(logged.contains("--headless=new"));
            assert!(logged.contains(&format!("--print-to-pdf={}", pdf.display())));
            assert!(logged.lines().last().unwrap().starts_with("file://"));
        }
    }
}
