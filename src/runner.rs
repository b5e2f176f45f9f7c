//! External command execution
//!
//! The pull and build steps go through [`CommandRunner`] so the webhook
//! handler can be driven in tests without spawning processes.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::info;

/// Result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    /// Stdout followed by stderr, lossily decoded.
    pub output: String,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` (program followed by its arguments) with `dir` as the
    /// working directory. `Err` means the process could not be run at all.
    async fn run(&self, dir: &Path, command: &[String]) -> io::Result<CommandOutput>;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, dir: &Path, command: &[String]) -> io::Result<CommandOutput> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        info!("Running (cwd = '{}'): {}", dir.display(), command.join(" "));

        let mut cmd = Command::new(program);
        cmd.current_dir(dir).args(args).kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output()).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("'{}' did not finish within {:?}", command.join(" "), limit),
                )
            })??,
            None => cmd.output().await?,
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let out = ProcessRunner::default()
            .run(dir.path(), &cmd(&["sh", "-c", "echo out; echo err >&2"]))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.status, Some(0));
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }

    #[tokio::test]
    async fn runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "here").unwrap();
        let out = ProcessRunner::default()
            .run(dir.path(), &cmd(&["cat", "marker"]))
            .await
            .unwrap();
        assert_eq!(out.output, "here");
    }

    #[tokio::test]
    async fn reports_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let out = ProcessRunner::default()
            .run(dir.path(), &cmd(&["sh", "-c", "exit 3"]))
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.status, Some(3));
    }

    #[tokio::test]
    async fn empty_command_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessRunner::default().run(dir.path(), &[]).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        assert!(
            ProcessRunner::default()
                .run(&gone, &cmd(&["true"]))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn timeout_kills_long_commands() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessRunner::new(Some(Duration::from_millis(100)))
            .run(dir.path(), &cmd(&["sleep", "5"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
