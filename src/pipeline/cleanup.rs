//! Post-run helper script (by default `kill_chrome.sh` in the project root).
//!
//! Headless Chrome occasionally leaves helper processes behind. Projects that
//! care ship a small script to reap them; it runs once after the last
//! document. The step never fails the run: a missing script is skipped and a
//! failing one is reported as a warning.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// What happened to the post-run helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// No script configured, or the run ended before the step.
    Disabled,
    /// A script is configured but does not exist.
    Skipped,
    /// The script exited successfully.
    Ran { stdout: String },
    /// The script could not be started or exited unsuccessfully.
    Failed { reason: String },
}

/// Run `bash <script>` with no arguments and wait for it.
pub async fn run_cleanup(script: &Path) -> CleanupOutcome {
    if !script.exists() {
        warn!("Cleanup script {} not found, skipping", script.display());
        return CleanupOutcome::Skipped;
    }

    debug!("Running cleanup script {}", script.display());
    let output = match Command::new("bash").arg(script).output().await {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run {}: {}", script.display(), e);
            return CleanupOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    if output.status.success() {
        CleanupOutcome::Ran {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        }
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match (stderr.trim(), output.status.code()) {
            ("", Some(code)) => format!("exit code {code}"),
            ("", None) => "terminated by signal".to_string(),
            (msg, _) => msg.to_string(),
        };
        warn!("Cleanup script {} failed: {}", script.display(), reason);
        CleanupOutcome::Failed { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_script_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = tokio_test::block_on(run_cleanup(&dir.path().join("kill_chrome.sh")));
        assert_eq!(outcome, CleanupOutcome::Skipped);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("kill_chrome.sh");
        std::fs::write(&script, "echo 'killed 2 processes'\n").unwrap();
        assert_eq!(
            run_cleanup(&script).await,
            CleanupOutcome::Ran {
                stdout: "killed 2 processes\n".into()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("kill_chrome.sh");
        std::fs::write(&script, "exit 7\n").unwrap();
        assert_eq!(
            run_cleanup(&script).await,
            CleanupOutcome::Failed {
                reason: "exit code 7".into()
            }
        );
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let json = serde_json::to_value(CleanupOutcome::Ran {
            stdout: "ok".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "ran");
        assert_eq!(json["stdout"], "ok");
    }
}
