//! External command execution
//!
//! The signing tool is an opaque collaborator: we hand it arguments, give
//! it a deadline, and collect its exit code and output. A command that
//! outlives its deadline is killed and reported with the conventional
//! shell-timeout exit code.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{RelayError, Result};

/// Exit code reported when a command is killed at its deadline
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Captured result of one external command run
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; [`TIMEOUT_EXIT_CODE`] if the deadline was hit
    pub code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited cleanly
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Run a command to completion with a deadline.
///
/// Output is captured concurrently so a chatty child cannot deadlock on a
/// full pipe. On timeout the child is killed and whatever output was
/// captured so far is returned with exit code 124.
pub async fn run_command(
    program: &Path,
    args: &[OsString],
    timeout: Duration,
) -> Result<CommandOutput> {
    debug!(program = %program.display(), args = args.len(), "running command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_task = tokio::spawn(drain(stdout_pipe));
    let stderr_task = tokio::spawn(drain(stderr_pipe));

    let code = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => {
            // Killed-by-signal has no code; fold it into a generic failure
            status?.code().unwrap_or(-1)
        }
        Err(_) => {
            warn!(
                program = %program.display(),
                timeout_sec = timeout.as_secs(),
                "command hit its deadline, killing it"
            );
            child.start_kill().ok();
            let _ = child.wait().await;
            TIMEOUT_EXIT_CODE
        }
    };

    let stdout = stdout_task
        .await
        .map_err(|e| RelayError::other(format!("stdout reader panicked: {e}")))?;
    let stderr = stderr_task
        .await
        .map_err(|e| RelayError::other(format!("stderr reader panicked: {e}")))?;

    Ok(CommandOutput {
        code,
        stdout,
        stderr,
    })
}

/// The last `max_chars` characters of diagnostic output
pub fn output_tail(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    text.chars().skip(total - max_chars).collect()
}

async fn drain<R: AsyncReadExt + Unpin>(pipe: Option<R>) -> String {
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}
