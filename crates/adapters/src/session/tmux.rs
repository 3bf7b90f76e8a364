// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux session adapter

use super::nudge::{deliver_nudge, NudgeTiming};
use super::{SessionAdapter, SessionError};
use crate::subprocess::{run, run_interactive, REMOTE_TIMEOUT, TMUX_TIMEOUT};
use async_trait::async_trait;
use gt_core::{shell_join, SessionId, SessionInfo};
use std::path::Path;
use std::process::Output;
use std::time::Duration;

/// Stderr fragments tmux prints when the target (or the whole server) is gone.
const MISSING_MARKERS: &[&str] = &[
    "can't find session",
    "can't find pane",
    "can't find window",
    "session not found",
    "no server running",
    "error connecting to",
    "no current session",
];

const INFO_FORMAT: &str = "#{session_name}|#{session_created}|#{session_attached}|#{session_windows}|#{session_activity}|#{session_last_attached}";

/// Exact-match session target (tmux otherwise accepts prefixes).
fn session_target(name: &str) -> String {
    format!("={name}")
}

/// Active pane of the named session.
fn pane_target(name: &str) -> String {
    format!("={name}:")
}

fn is_missing(stderr: &str) -> bool {
    MISSING_MARKERS.iter().any(|m| stderr.contains(m))
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Keep at most the last `lines` lines, ignoring trailing blank rows of the pane.
fn last_lines(captured: &str, lines: u32) -> String {
    let rows: Vec<&str> = captured.trim_end_matches('\n').lines().collect();
    let end = rows
        .iter()
        .rposition(|row| !row.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    let start = end.saturating_sub(lines as usize);
    rows[start..end].join("\n")
}

/// Undo the quoting tmux applies to `#{pane_start_command}`.
fn unquote_start_command(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => trimmed.to_string(),
    }
}

fn parse_info(name: &str, raw: &str) -> SessionInfo {
    let mut fields = raw.trim_end().splitn(6, '|');
    let mut next = || fields.next().unwrap_or_default().to_string();
    let reported_name = next();
    let created = next();
    let attached = next();
    let windows = next();
    let activity = next();
    let last_attached = next();
    SessionInfo {
        name: if reported_name.is_empty() {
            name.to_string()
        } else {
            reported_name
        },
        created,
        attached: attached.parse::<u32>().map(|n| n > 0).unwrap_or(false),
        windows: windows.parse::<u32>().unwrap_or(1).max(1),
        activity,
        last_attached,
    }
}

/// How tmux is reached: directly, or through a remote shell transport such
/// as `ssh -o BatchMode=yes host`.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tmux {
    transport: Vec<String>,
}

impl Tmux {
    pub(crate) fn local() -> Self {
        Self::default()
    }

    pub(crate) fn remote(transport: &str) -> Self {
        Self {
            transport: transport.split_whitespace().map(String::from).collect(),
        }
    }

    pub(crate) fn is_remote(&self) -> bool {
        !self.transport.is_empty()
    }

    fn timeout(&self) -> Duration {
        if self.is_remote() {
            REMOTE_TIMEOUT
        } else {
            TMUX_TIMEOUT
        }
    }

    /// Remote command string for `tmux <args>`, every word shell-escaped.
    pub(crate) fn remote_command(args: &[&str]) -> String {
        shell_join(std::iter::once("tmux").chain(args.iter().copied()))
    }

    /// Argument vector that runs `tmux <args>`.
    pub(crate) fn argv(&self, args: &[&str]) -> Vec<String> {
        match self.transport.split_first() {
            None => std::iter::once("tmux")
                .chain(args.iter().copied())
                .map(String::from)
                .collect(),
            Some((program, rest)) => {
                let mut argv = vec![program.clone()];
                argv.extend(rest.iter().cloned());
                argv.push(Self::remote_command(args));
                argv
            }
        }
    }

    /// Interactive variant of [`argv`](Self::argv): the transport gets `-t`
    /// so the remote side allocates a pseudo-tty.
    pub(crate) fn interactive_argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = self.argv(args);
        if self.is_remote() {
            argv.insert(1, "-t".to_string());
        }
        argv
    }

    /// Run a shell snippet on the tmux host (locally via `sh -c`).
    pub(crate) async fn shell(&self, script: &str, description: &str) -> Result<Output, SessionError> {
        let argv = match self.transport.split_first() {
            None => vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            Some((program, rest)) => {
                let mut argv = vec![program.clone()];
                argv.extend(rest.iter().cloned());
                argv.push(script.to_string());
                argv
            }
        };
        run(&argv, self.timeout(), description).await
    }

    /// Run tmux, returning the raw output whatever the exit status.
    pub(crate) async fn output(&self, args: &[&str], description: &str) -> Result<Output, SessionError> {
        run(&self.argv(args), self.timeout(), description).await
    }

    /// Run tmux, mapping a non-zero exit to `NotFound` (target gone) or
    /// `CommandFailed` (anything else, carrying stderr).
    pub(crate) async fn checked(
        &self,
        target: &str,
        args: &[&str],
        description: &str,
    ) -> Result<Output, SessionError> {
        let output = self.output(args, description).await?;
        if output.status.success() {
            return Ok(output);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_missing(&stderr) {
            Err(SessionError::NotFound(target.to_string()))
        } else {
            Err(SessionError::CommandFailed(format!("{description}: {stderr}")))
        }
    }

    /// Run tmux interactively with inherited stdio (attach).
    pub(crate) async fn interactive(&self, args: &[&str], description: &str) -> Result<(), SessionError> {
        let argv = self.interactive_argv(args);
        let status = run_interactive(&argv, description).await?;
        if status.success() {
            Ok(())
        } else {
            Err(SessionError::CommandFailed(format!(
                "{description} exited with {status}"
            )))
        }
    }

    pub(crate) async fn has_session(&self, name: &str) -> Result<bool, SessionError> {
        let output = self
            .output(&["has-session", "-t", &session_target(name)], "tmux has-session")
            .await?;
        if output.status.success() {
            return Ok(true);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing(&stderr) || stderr.trim().is_empty() {
            Ok(false)
        } else {
            Err(SessionError::CommandFailed(format!(
                "tmux has-session: {}",
                stderr.trim()
            )))
        }
    }

    pub(crate) async fn new_session(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<(), SessionError> {
        if name.is_empty() {
            return Err(SessionError::Invalid("empty session name".to_string()));
        }
        if self.has_session(name).await? {
            return Err(SessionError::Duplicate(name.to_string()));
        }
        let work_dir = work_dir.to_string_lossy();
        let output = self
            .output(
                &["new-session", "-d", "-s", name, "-c", &work_dir, command],
                "tmux new-session",
            )
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(session = name, stderr = %stderr, "tmux new-session failed");
            if stderr.contains("duplicate session") {
                return Err(SessionError::Duplicate(name.to_string()));
            }
            return Err(SessionError::CommandFailed(format!("tmux new-session: {stderr}")));
        }
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(session = name, stderr = %stderr, "tmux new-session stderr (non-fatal)");
        }
        Ok(())
    }

    pub(crate) async fn kill_session(&self, name: &str) -> Result<(), SessionError> {
        match self
            .checked(name, &["kill-session", "-t", &session_target(name)], "tmux kill-session")
            .await
        {
            Ok(_) | Err(SessionError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn respawn_pane(&self, name: &str, command: &str) -> Result<(), SessionError> {
        if !self.has_session(name).await? {
            return Err(SessionError::NotRunning(name.to_string()));
        }
        let target = pane_target(name);
        if let Err(e) = self
            .checked(name, &["clear-history", "-t", &target], "tmux clear-history")
            .await
        {
            tracing::warn!(session = name, error = %e, "clear-history failed (non-fatal)");
        }
        self.checked(
            name,
            &["respawn-pane", "-k", "-t", &target, command],
            "tmux respawn-pane",
        )
        .await
        .map(|_| ())
    }

    pub(crate) async fn send_literal(&self, name: &str, text: &str) -> Result<(), SessionError> {
        // -l = literal mode (no key name interpretation)
        // -- = end of options (handles text starting with -)
        self.checked(
            name,
            &["send-keys", "-t", &pane_target(name), "-l", "--", text],
            "tmux send-keys literal",
        )
        .await
        .map(|_| ())
    }

    pub(crate) async fn send_key(&self, name: &str, key: &str) -> Result<(), SessionError> {
        self.checked(
            name,
            &["send-keys", "-t", &pane_target(name), key],
            "tmux send-keys",
        )
        .await
        .map(|_| ())
    }

    pub(crate) async fn capture(&self, name: &str, lines: u32) -> Result<String, SessionError> {
        let start = format!("-{lines}");
        let output = self
            .checked(
                name,
                &["capture-pane", "-p", "-t", &pane_target(name), "-S", &start],
                "tmux capture-pane",
            )
            .await?;
        Ok(last_lines(&stdout_of(&output), lines))
    }

    pub(crate) async fn capture_all(&self, name: &str) -> Result<String, SessionError> {
        let output = self
            .checked(
                name,
                &["capture-pane", "-p", "-t", &pane_target(name), "-S", "-"],
                "tmux capture-pane",
            )
            .await?;
        Ok(stdout_of(&output))
    }

    /// First line of `list-panes -F <format>` for the session's active window.
    pub(crate) async fn pane_field(&self, name: &str, format: &str) -> Result<String, SessionError> {
        let output = self
            .checked(
                name,
                &["list-panes", "-t", &pane_target(name), "-F", format],
                "tmux list-panes",
            )
            .await?;
        Ok(stdout_of(&output)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Foreground command matches, or a direct child of the pane process does
    /// (agents launched through a wrapper shell or `node`).
    pub(crate) async fn is_running(&self, name: &str, process_names: &[String]) -> bool {
        if process_names.is_empty() {
            return false;
        }
        let current = match self.pane_field(name, "#{pane_current_command}").await {
            Ok(current) => current,
            Err(_) => return false,
        };
        if process_names.iter().any(|p| *p == current) {
            return true;
        }

        let pid = match self.pane_field(name, "#{pane_pid}").await {
            Ok(pid) if !pid.is_empty() && pid.chars().all(|c| c.is_ascii_digit()) => pid,
            _ => return false,
        };
        match self.shell(&format!("pgrep -l -P {pid}"), "pgrep children").await {
            Ok(output) if output.status.success() => stdout_of(&output).lines().any(|line| {
                line.split_whitespace()
                    .nth(1)
                    .is_some_and(|child| process_names.iter().any(|p| p == child))
            }),
            _ => false,
        }
    }

    pub(crate) async fn list_sessions(&self) -> Result<Vec<SessionId>, SessionError> {
        let output = self
            .output(&["list-sessions", "-F", "#{session_name}"], "tmux list-sessions")
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_missing(&stderr) {
                return Ok(Vec::new());
            }
            return Err(SessionError::CommandFailed(format!(
                "tmux list-sessions: {}",
                stderr.trim()
            )));
        }
        Ok(stdout_of(&output)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(SessionId::new)
            .collect())
    }

    pub(crate) async fn info(&self, name: &str) -> Result<SessionInfo, SessionError> {
        let output = self
            .checked(
                name,
                &["display-message", "-p", "-t", &session_target(name), INFO_FORMAT],
                "tmux display-message",
            )
            .await?;
        Ok(parse_info(name, &stdout_of(&output)))
    }

    pub(crate) async fn start_command(&self, name: &str) -> Result<String, SessionError> {
        let raw = self.pane_field(name, "#{pane_start_command}").await?;
        Ok(unquote_start_command(&raw))
    }
}

/// Tmux-based session adapter on the local host
#[derive(Clone)]
pub struct TmuxAdapter {
    tmux: Tmux,
    nudge_timing: NudgeTiming,
}

impl Default for TmuxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TmuxAdapter {
    pub fn new() -> Self {
        Self {
            tmux: Tmux::local(),
            nudge_timing: NudgeTiming::default(),
        }
    }

    pub fn with_nudge_timing(mut self, timing: NudgeTiming) -> Self {
        self.nudge_timing = timing;
        self
    }

    fn inside_client() -> bool {
        std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
    }
}

#[async_trait]
impl SessionAdapter for TmuxAdapter {
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError> {
        // Precondition: work_dir must exist
        if !work_dir.exists() {
            return Err(SessionError::Invalid(format!(
                "working directory does not exist: {}",
                work_dir.display()
            )));
        }
        self.tmux.new_session(name, work_dir, command).await?;
        Ok(SessionId::new(name))
    }

    async fn stop(&self, id: &str) -> Result<(), SessionError> {
        self.tmux.kill_session(id).await
    }

    async fn respawn(&self, id: &str, command: &str) -> Result<(), SessionError> {
        self.tmux.respawn_pane(id, command).await
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        self.tmux.has_session(id).await
    }

    async fn send(&self, id: &str, text: &str) -> Result<(), SessionError> {
        self.tmux.send_literal(id, text).await?;
        self.tmux.send_key(id, "Enter").await
    }

    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError> {
        self.tmux.send_literal(id, text).await
    }

    async fn send_control(&self, id: &str, key: &str) -> Result<(), SessionError> {
        self.tmux.send_key(id, key).await
    }

    async fn nudge(&self, id: &str, message: &str) -> Result<(), SessionError> {
        deliver_nudge(self, id, message, &self.nudge_timing).await
    }

    async fn capture(&self, id: &str, lines: u32) -> Result<String, SessionError> {
        self.tmux.capture(id, lines).await
    }

    async fn capture_all(&self, id: &str) -> Result<String, SessionError> {
        self.tmux.capture_all(id).await
    }

    async fn is_running(&self, id: &str, process_names: &[String]) -> bool {
        self.tmux.is_running(id, process_names).await
    }

    async fn list(&self) -> Result<Vec<SessionId>, SessionError> {
        self.tmux.list_sessions().await
    }

    async fn get_info(&self, id: &str) -> Result<SessionInfo, SessionError> {
        self.tmux.info(id).await
    }

    async fn get_start_command(&self, id: &str) -> Result<String, SessionError> {
        self.tmux.start_command(id).await
    }

    async fn attach(&self, id: &str) -> Result<(), SessionError> {
        if !self.tmux.has_session(id).await? {
            return Err(SessionError::NotFound(id.to_string()));
        }
        // Nested attach is refused by tmux; switch the client instead
        if Self::inside_client() {
            return self.switch_to(id).await;
        }
        self.tmux
            .interactive(&["attach-session", "-t", &session_target(id)], "tmux attach-session")
            .await
    }

    async fn switch_to(&self, id: &str) -> Result<(), SessionError> {
        if !Self::inside_client() {
            return Err(SessionError::NotInClient);
        }
        if !self.tmux.has_session(id).await? {
            return Err(SessionError::NotFound(id.to_string()));
        }
        let current = self
            .tmux
            .output(&["display-message", "-p", "#{session_name}"], "tmux display-message")
            .await?;
        if stdout_of(&current).trim() == id {
            return Ok(());
        }
        self.tmux
            .checked(
                id,
                &["switch-client", "-t", &session_target(id)],
                "tmux switch-client",
            )
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
