//! yt-dlp subprocess plumbing.
//!
//! Both the resolver and the materializer shell out to the same binary. This
//! module owns locating it, spawning it with piped output and turning its
//! exit status and stderr into a [`YtDlpError`].

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Executable name looked up on `PATH`.
pub const YTDLP_BINARY: &str = "yt-dlp";

/// Errors from running yt-dlp.
#[derive(Error, Debug)]
pub enum YtDlpError {
    #[error("yt-dlp not found ({0})")]
    NotFound(String),

    #[error("Failed to spawn yt-dlp: {0}")]
    Spawn(#[source] io::Error),

    #[error("{0}")]
    Failed(String),

    #[error("yt-dlp timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Handle on a yt-dlp executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::locate()
    }
}

impl YtDlp {
    /// Find yt-dlp on `PATH`.
    ///
    /// Falls back to the bare binary name when the lookup fails, so a binary
    /// installed after startup is still picked up by the OS at spawn time.
    pub fn locate() -> Self {
        let program = which::which(YTDLP_BINARY).unwrap_or_else(|_| PathBuf::from(YTDLP_BINARY));
        Self { program }
    }

    /// Use an explicit executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the configured executable currently resolves.
    pub fn is_installed(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    /// Run yt-dlp to completion and return its stdout.
    ///
    /// The child is killed if `timeout` elapses or the returned future is
    /// dropped.
    pub(crate) async fn run(
        &self,
        args: Vec<OsString>,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, YtDlpError> {
        debug!(program = %self.program.display(), ?args, "Spawning yt-dlp");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    YtDlpError::NotFound(self.program.display().to_string())
                } else {
                    YtDlpError::Spawn(e)
                }
            })?;

        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| YtDlpError::Timeout(limit))?,
            None => child.wait_with_output().await,
        }
        .map_err(YtDlpError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = error_summary(&stderr)
                .unwrap_or_else(|| format!("exited with status {}", output.status));
            return Err(YtDlpError::Failed(reason));
        }

        Ok(output.stdout)
    }
}

/// Pick the most useful line out of yt-dlp's stderr.
///
/// Prefers the last `ERROR:` line (without the prefix), then the last
/// non-empty line.
pub(crate) fn error_summary(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .map(|l| l.trim().to_string())
        .or_else(|| lines.last().map(|l| (*l).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_summary_prefers_error_line() {
        let stderr = "WARNING: something odd\nERROR: [generic] Unsupported URL: https://x\n";
        assert_eq!(
            error_summary(stderr).as_deref(),
            Some("[generic] Unsupported URL: https://x")
        );
    }

    #[test]
    fn test_error_summary_falls_back_to_last_line() {
        assert_eq!(
            error_summary("first\n\nlast line\n").as_deref(),
            Some("last line")
        );
        assert_eq!(error_summary("  \n"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_found() {
        let ytdlp = YtDlp::with_program("/nonexistent/vidio-test/yt-dlp");
        assert!(!ytdlp.is_installed());

        let err = ytdlp.run(vec!["--version".into()], None).await.unwrap_err();
        assert!(matches!(err, YtDlpError::NotFound(_)));
    }
}
