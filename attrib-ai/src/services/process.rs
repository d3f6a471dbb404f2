//! Deadline-bounded child processes
//!
//! External tools run under `tokio::process` with `kill_on_drop`, so a
//! cancelled or timed-out call never leaves its child behind.

use std::fmt::Display;
use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

/// Child process errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable missing or not runnable
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Process still running at the deadline (it has been killed)
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run a command to completion, killing it once `timeout` elapses
///
/// `input` is written to the child's stdin, which is then closed.
pub async fn run_with_timeout(
    mut command: Command,
    input: Option<&str>,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let program = command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned();

    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    if let (Some(text), Some(mut stdin)) = (input, child.stdin.take()) {
        let text = text.to_owned();
        // Written concurrently with draining stdout so a large prompt cannot deadlock
        tokio::spawn(async move {
            // Broken pipe here means the child exited early; its status tells the story
            let _ = stdin.write_all(text.as_bytes()).await;
        });
    }

    // Dropping the wait future on timeout drops the child, which kills it
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            Ok(ProcessOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Err(_) => Err(ProcessError::Timeout { program, timeout }),
    }
}

/// Run `work` as its own task, bounded by `timeout`
///
/// Errors, panics and timeouts are logged under `label` and collapse to
/// `None`; callers substitute their own fallback. A timed-out task is aborted
/// and has been dropped by the time this returns, so its resources (child
/// processes included) are released before the caller moves on.
pub async fn run_bounded<T, E, F>(label: &str, timeout: Duration, work: F) -> Option<T>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let mut task = tokio::spawn(work);
    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(value))) => Some(value),
        Ok(Ok(Err(e))) => {
            warn!("{} failed: {}", label, e);
            None
        }
        Ok(Err(e)) => {
            warn!("{} task aborted: {}", label, e);
            None
        }
        Err(_) => {
            task.abort();
            let _ = task.await;
            warn!("{} exceeded {:?}", label, timeout);
            None
        }
    }
}
