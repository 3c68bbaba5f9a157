//! # browser-locate
//!
//! Find a Chromium-family browser executable (Google Chrome, Chromium,
//! Microsoft Edge) that can run in headless print-to-PDF mode.
//!
//! ## How it works
//!
//! A [`BrowserLocator`] holds an ordered list of [`Strategy`] values. Each
//! strategy proposes zero or more candidate paths; [`BrowserLocator::locate`]
//! returns the first candidate that exists on disk. This is first-match, not
//! best-match: no version check or capability probe is performed.
//!
//! [`BrowserLocator::system`] builds the default chain:
//!
//! 1. `PUPPETEER_EXECUTABLE_PATH`: explicit override.
//! 2. `CHROME_PATH`: secondary override.
//! 3. Conventional install locations for the current OS (see
//!    [`conventional_install_paths`]).
//! 4. A `PATH` search for the usual executable names.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use browser_locate::{BrowserLocator, ExplicitPath};
//!
//! // Default chain
//! let found = BrowserLocator::system().locate();
//!
//! // Custom chain: a pinned path first, then the defaults
//! let locator = BrowserLocator::new()
//!     .with(ExplicitPath::new("/opt/chrome/chrome"))
//!     .extend(BrowserLocator::system());
//! match locator.require() {
//!     Ok(b) => println!("using {} (via {})", b.path.display(), b.strategy),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PUPPETEER_EXECUTABLE_PATH`: consulted first.
//! - `CHROME_PATH`: consulted second.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Primary override variable, shared with the puppeteer ecosystem.
pub const OVERRIDE_ENV: &str = "PUPPETEER_EXECUTABLE_PATH";

/// Secondary override variable.
pub const FALLBACK_ENV: &str = "CHROME_PATH";

/// Executable names tried by [`SearchPath::default`].
pub const DEFAULT_EXECUTABLE_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "microsoft-edge",
];

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by [`BrowserLocator::require`].
#[derive(Error, Debug)]
pub enum LocateError {
    /// Every strategy was tried and no candidate exists on disk.
    #[error(
        "Chrome/Chromium not found ({count} candidate paths checked).\n\
Install Google Chrome, Chromium or Microsoft Edge, or point \
{override_env} / {fallback_env} at an existing browser executable.",
        count = .searched.len(),
        override_env = OVERRIDE_ENV,
        fallback_env = FALLBACK_ENV
    )]
    NotFound { searched: Vec<PathBuf> },
}

// ── Strategies ───────────────────────────────────────────────────────────────

/// One way of proposing browser executable paths.
pub trait Strategy: Send + Sync + fmt::Debug {
    /// Short label used in logs, e.g. `env:CHROME_PATH`.
    fn name(&self) -> String;

    /// Candidate paths in priority order. Existence is checked by the locator.
    fn candidates(&self) -> Vec<PathBuf>;
}

/// A single caller-supplied path (e.g. a `--browser` flag).
#[derive(Debug, Clone)]
pub struct ExplicitPath(PathBuf);

impl ExplicitPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl Strategy for ExplicitPath {
    fn name(&self) -> String {
        "explicit".to_string()
    }

    fn candidates(&self) -> Vec<PathBuf> {
        vec![self.0.clone()]
    }
}

/// Read a path from an environment variable. Unset or empty yields nothing.
#[derive(Debug, Clone)]
pub struct EnvVar {
    var: String,
}

impl EnvVar {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Strategy for EnvVar {
    fn name(&self) -> String {
        format!("env:{}", self.var)
    }

    fn candidates(&self) -> Vec<PathBuf> {
        match std::env::var_os(&self.var) {
            Some(v) if !v.is_empty() => vec![PathBuf::from(v)],
            _ => Vec::new(),
        }
    }
}

/// A fixed list of install locations.
#[derive(Debug, Clone)]
pub struct InstallPaths(Vec<PathBuf>);

impl InstallPaths {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }

    /// Install locations for the OS this binary was compiled for.
    pub fn conventional() -> Self {
        Self(conventional_install_paths(std::env::consts::OS))
    }
}

impl Strategy for InstallPaths {
    fn name(&self) -> String {
        "install-paths".to_string()
    }

    fn candidates(&self) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// Look up executable names in the directories of `PATH`.
#[derive(Debug, Clone)]
pub struct SearchPath {
    names: Vec<String>,
    path_var: Option<OsString>,
}

impl SearchPath {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            path_var: None,
        }
    }

    /// Search this `PATH`-style value instead of the process environment.
    pub fn in_dirs(mut self, path_var: impl Into<OsString>) -> Self {
        self.path_var = Some(path_var.into());
        self
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE_NAMES.iter().copied())
    }
}

impl Strategy for SearchPath {
    fn name(&self) -> String {
        "PATH".to_string()
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let Some(path_var) = self.path_var.clone().or_else(|| std::env::var_os("PATH")) else {
            return Vec::new();
        };
        let suffix = std::env::consts::EXE_SUFFIX;

        std::env::split_paths(&path_var)
            .flat_map(|dir| {
                self.names
                    .iter()
                    .map(move |name| dir.join(format!("{name}{suffix}")))
            })
            .collect()
    }
}

// ── Conventional install paths ───────────────────────────────────────────────

/// Conventional browser install locations for `os` (as in
/// [`std::env::consts::OS`]), most preferred first.
///
/// Google Chrome comes before Chromium, which comes before Microsoft Edge.
/// Per-user locations follow the system-wide ones.
pub fn conventional_install_paths(os: &str) -> Vec<PathBuf> {
    match os {
        "macos" => {
            let bundles = [
                "Google Chrome.app/Contents/MacOS/Google Chrome",
                "Chromium.app/Contents/MacOS/Chromium",
                "Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
            ];
            let mut paths: Vec<PathBuf> = bundles
                .iter()
                .map(|b| Path::new("/Applications").join(b))
                .collect();
            if let Some(home) = dirs::home_dir() {
                paths.extend(bundles.iter().map(|b| home.join("Applications").join(b)));
            }
            paths
        }
        "linux" | "freebsd" | "openbsd" | "netbsd" => [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/opt/google/chrome/chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/bin/microsoft-edge",
            "/opt/microsoft/msedge/msedge",
        ]
        .iter()
        .map(PathBuf::from)
        .collect(),
        "windows" => {
            let mut paths: Vec<PathBuf> = [
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files\Chromium\Application\chrome.exe",
                r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
            ]
            .iter()
            .map(PathBuf::from)
            .collect();
            if let Some(local) = dirs::data_local_dir() {
                paths.push(local.join(r"Google\Chrome\Application\chrome.exe"));
                paths.push(local.join(r"Chromium\Application\chrome.exe"));
            }
            paths
        }
        _ => Vec::new(),
    }
}

// ── Locator ──────────────────────────────────────────────────────────────────

/// A browser executable found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    /// [`Strategy::name`] of the strategy that produced `path`.
    pub strategy: String,
}

/// Ordered list of strategies; the first existing candidate wins.
#[derive(Debug, Clone, Default)]
pub struct BrowserLocator {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl BrowserLocator {
    /// An empty locator. `locate()` on it always returns `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default chain: both env overrides, install paths, then `PATH`.
    pub fn system() -> Self {
        Self::new()
            .with(EnvVar::new(OVERRIDE_ENV))
            .with(EnvVar::new(FALLBACK_ENV))
            .with(InstallPaths::conventional())
            .with(SearchPath::default())
    }

    /// Append a strategy at the lowest priority.
    pub fn with(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Append every strategy of `other`, keeping its order.
    pub fn extend(mut self, other: BrowserLocator) -> Self {
        self.strategies.extend(other.strategies);
        self
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Every candidate in priority order, paired with its strategy name.
    pub fn candidates(&self) -> Vec<(String, PathBuf)> {
        self.strategies
            .iter()
            .flat_map(|s| {
                let name = s.name();
                s.candidates().into_iter().map(move |p| (name.clone(), p))
            })
            .collect()
    }

    /// Return the first candidate that exists as a file.
    pub fn locate(&self) -> Option<Located> {
        self.strategies.iter().find_map(|s| {
            s.candidates()
                .into_iter()
                .find(|p| p.is_file())
                .map(|path| Located {
                    path,
                    strategy: s.name(),
                })
        })
    }

    /// Like [`locate`](Self::locate), but reports what was searched on failure.
    pub fn require(&self) -> Result<Located, LocateError> {
        self.locate().ok_or_else(|| LocateError::NotFound {
            searched: self.candidates().into_iter().map(|(_, p)| p).collect(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, b"#!/bin/sh\n").unwrap();
        p
    }

    #[test]
    fn empty_locator_finds_nothing() {
        assert_eq!(BrowserLocator::new().locate(), None);
    }

    #[test]
    fn missing_candidates_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let locator = BrowserLocator::new()
            .with(ExplicitPath::new(dir.path().join("nope")))
            .with(InstallPaths::new(vec![
                dir.path().join("chrome"),
                dir.path().join("chromium"),
            ]));
        assert!(locator.locate().is_none());
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let second = touch(dir.path(), "chromium");
        let third = touch(dir.path(), "edge");
        let locator = BrowserLocator::new()
            .with(ExplicitPath::new(dir.path().join("chrome")))
            .with(InstallPaths::new(vec![second.clone(), third]));

        let found = locator.locate().unwrap();
        assert_eq!(found.path, second);
        assert_eq!(found.strategy, "install-paths");
    }

    #[test]
    fn directories_are_not_executables() {
        let dir = tempfile::tempdir().unwrap();
        let locator = BrowserLocator::new().with(ExplicitPath::new(dir.path()));
        assert!(locator.locate().is_none());
    }

    #[test]
    fn env_var_strategy_reads_variable() {
        let dir = tempfile::tempdir().unwrap();
        let exe = touch(dir.path(), "chrome");
        let var = "BROWSER_LOCATE_TEST_ENV_VAR_READS";
        std::env::set_var(var, &exe);
        let found = BrowserLocator::new().with(EnvVar::new(var)).locate();
        std::env::remove_var(var);

        let found = found.unwrap();
        assert_eq!(found.path, exe);
        assert_eq!(found.strategy, format!("env:{var}"));
    }

    #[test]
    fn empty_env_var_is_ignored() {
        let var = "BROWSER_LOCATE_TEST_ENV_VAR_EMPTY";
        std::env::set_var(var, "");
        let candidates = EnvVar::new(var).candidates();
        std::env::remove_var(var);
        assert!(candidates.is_empty());
    }

    #[test]
    fn search_path_joins_names_with_dirs() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let exe = touch(b.path(), &format!("chromium{}", std::env::consts::EXE_SUFFIX));
        let path_var = std::env::join_paths([a.path(), b.path()]).unwrap();

        let strategy = SearchPath::new(["google-chrome", "chromium"]).in_dirs(path_var);
        assert_eq!(strategy.candidates().len(), 4);

        let found = BrowserLocator::new().with(strategy).locate().unwrap();
        assert_eq!(found.path, exe);
    }

    #[test]
    fn system_chain_order() {
        assert_eq!(
            BrowserLocator::system().strategy_names(),
            vec![
                format!("env:{OVERRIDE_ENV}"),
                format!("env:{FALLBACK_ENV}"),
                "install-paths".to_string(),
                "PATH".to_string(),
            ]
        );
    }

    #[test]
    fn macos_prefers_chrome_then_chromium_then_edge() {
        let paths = conventional_install_paths("macos");
        assert_eq!(
            paths[0],
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome")
        );
        assert_eq!(
            paths[1],
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium")
        );
        assert_eq!(
            paths[2],
            PathBuf::from("/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge")
        );
    }

    #[test]
    fn unknown_os_has_no_install_paths() {
        assert!(conventional_install_paths("plan9").is_empty());
        assert!(!conventional_install_paths("linux").is_empty());
    }

    #[test]
    fn not_found_names_both_env_vars() {
        let err = BrowserLocator::new()
            .with(InstallPaths::new(vec![PathBuf::from("/definitely/not/chrome")]))
            .require()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(OVERRIDE_ENV), "got: {msg}");
        assert!(msg.contains(FALLBACK_ENV), "got: {msg}");
        assert!(msg.contains("1 candidate"), "got: {msg}");
    }
}
