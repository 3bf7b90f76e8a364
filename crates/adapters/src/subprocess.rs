// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running multiplexer commands under a deadline

use crate::session::SessionError;
use std::process::{ExitStatus, Output};
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for local tmux commands.
pub const TMUX_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for tmux commands sent over a remote shell transport.
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

fn command(argv: &[String], description: &str) -> Result<Command, SessionError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| SessionError::Invalid(format!("{description}: empty command line")))?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

/// Run `argv` to completion, capturing output.
///
/// A non-zero exit is returned, not raised. Spawn failures and deadline
/// expiry become [`SessionError::CommandFailed`] naming `description`; the
/// child is killed if the deadline passes.
pub async fn run(
    argv: &[String],
    timeout: Duration,
    description: &str,
) -> Result<Output, SessionError> {
    let mut cmd = command(argv, description)?;
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(SessionError::CommandFailed(format!(
            "{description} failed: {e}"
        ))),
        Err(_) => Err(SessionError::CommandFailed(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Run `argv` with the caller's terminal attached. No deadline.
pub async fn run_interactive(argv: &[String], description: &str) -> Result<ExitStatus, SessionError> {
    command(argv, description)?
        .status()
        .await
        .map_err(|e| SessionError::CommandFailed(format!("{description} failed: {e}")))
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
