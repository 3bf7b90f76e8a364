// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux on another host, reached over a shell transport such as `ssh host`.

use super::mirror::MirrorSource;
use super::nudge::{deliver_nudge, NudgeTiming};
use super::tmux::Tmux;
use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gt_core::{shell_escape, shell_join, SessionId, SessionInfo};
use std::path::Path;
use std::time::Duration;

/// Env var carrying the transport a remote session uses to reach back to
/// the originating host.
pub const CALLBACK_TRANSPORT_VAR: &str = "GT_CALLBACK_TRANSPORT";

/// Grace between TERM and KILL when reaping pane descendants on stop.
const DESCENDANT_GRACE: Duration = Duration::from_millis(100);

/// Session adapter driving tmux on a remote host.
///
/// Each verb runs as `<transport...> 'tmux <escaped args>'`.
#[derive(Clone)]
pub struct RemoteTmuxAdapter {
    tmux: Tmux,
    transport: String,
    callback_transport: Option<String>,
    nudge_timing: NudgeTiming,
}

impl RemoteTmuxAdapter {
    /// `transport` is split on whitespace, e.g. `ssh -o BatchMode=yes box`.
    pub fn new(transport: impl Into<String>) -> Self {
        let transport = transport.into();
        Self {
            tmux: Tmux::remote(&transport),
            transport,
            callback_transport: None,
            nudge_timing: NudgeTiming::default(),
        }
    }

    pub fn with_callback_transport(mut self, callback: impl Into<String>) -> Self {
        self.callback_transport = Some(callback.into());
        self
    }

    pub fn with_nudge_timing(mut self, timing: NudgeTiming) -> Self {
        self.nudge_timing = timing;
        self
    }

    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// The command actually launched in the remote pane.
    pub(crate) fn launch_command(&self, command: &str) -> String {
        match &self.callback_transport {
            Some(callback) => format!(
                "{CALLBACK_TRANSPORT_VAR}={} {command}",
                shell_escape(callback)
            ),
            None => command.to_string(),
        }
    }

    /// Write `contents` to `path` on the remote host.
    pub async fn write_file(&self, path: &str, contents: &[u8]) -> Result<(), SessionError> {
        let script = write_file_script(path, contents);
        let output = self.tmux.shell(&script, "remote write-file").await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(SessionError::CommandFailed(format!(
                "remote write-file {path}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    /// TERM then KILL the direct children of the pane process.
    async fn kill_descendants(&self, id: &str) {
        let pid = match self.tmux.pane_field(id, "#{pane_pid}").await {
            Ok(pid) if !pid.is_empty() && pid.chars().all(|c| c.is_ascii_digit()) => pid,
            _ => return,
        };
        if let Err(e) = self
            .tmux
            .shell(&format!("pkill -TERM -P {pid}"), "pkill -TERM")
            .await
        {
            tracing::warn!(session = id, error = %e, "descendant TERM failed (non-fatal)");
            return;
        }
        tokio::time::sleep(DESCENDANT_GRACE).await;
        if let Err(e) = self
            .tmux
            .shell(&format!("pkill -KILL -P {pid}"), "pkill -KILL")
            .await
        {
            tracing::warn!(session = id, error = %e, "descendant KILL failed (non-fatal)");
        }
    }
}

fn write_file_script(path: &str, contents: &[u8]) -> String {
    format!(
        "printf '%s' {} | base64 -d > {}",
        shell_escape(&BASE64.encode(contents)),
        shell_escape(path)
    )
}

#[async_trait]
impl SessionAdapter for RemoteTmuxAdapter {
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError> {
        self.tmux
            .new_session(name, work_dir, &self.launch_command(command))
            .await?;
        tracing::info!(session = name, transport = %self.transport, "remote session created");
        Ok(SessionId::new(name))
    }

    async fn stop(&self, id: &str) -> Result<(), SessionError> {
        self.kill_descendants(id).await;
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
        self.tmux
            .interactive(&["attach-session", "-t", &format!("={id}")], "remote attach")
            .await
    }

    async fn switch_to(&self, _id: &str) -> Result<(), SessionError> {
        Err(SessionError::Unsupported(
            "switch_to on a remote tmux server".to_string(),
        ))
    }
}

impl MirrorSource for RemoteTmuxAdapter {
    fn attach_command(&self, id: &str) -> String {
        shell_join(
            self.tmux
                .interactive_argv(&["attach-session", "-t", &format!("={id}")])
                .iter()
                .map(String::as_str),
        )
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
