// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote sessions with a local attach mirror.

use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use gt_core::{SessionId, SessionInfo};
use std::path::Path;

/// A driver whose sessions can be attached to from a local shell command.
pub trait MirrorSource: SessionAdapter {
    /// Shell command that attaches the current terminal to session `id`.
    fn attach_command(&self, id: &str) -> String;
}

/// Remote driver (source of truth) paired with a local driver that hosts
/// one mirror session per remote session for low-latency attach.
#[derive(Clone)]
pub struct MirrorSessionAdapter<R, L> {
    remote: R,
    local: L,
}

impl<R: MirrorSource, L: SessionAdapter> MirrorSessionAdapter<R, L> {
    pub fn new(remote: R, local: L) -> Self {
        Self { remote, local }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    async fn has_mirror(&self, id: &str) -> bool {
        self.local.exists(id).await.unwrap_or(false)
    }
}

#[async_trait]
impl<R: MirrorSource, L: SessionAdapter> SessionAdapter for MirrorSessionAdapter<R, L> {
    async fn start(
        &self,
        name: &str,
        work_dir: &Path,
        command: &str,
    ) -> Result<SessionId, SessionError> {
        let id = self.remote.start(name, work_dir, command).await?;

        let attach = self.remote.attach_command(name);
        let mirror_dir = std::env::temp_dir();
        if let Err(e) = self.local.start(name, &mirror_dir, &attach).await {
            tracing::warn!(session = name, error = %e, "local mirror not created (non-fatal)");
        }
        Ok(id)
    }

    async fn stop(&self, id: &str) -> Result<(), SessionError> {
        if let Err(e) = self.local.stop(id).await {
            tracing::warn!(session = id, error = %e, "local mirror stop failed (non-fatal)");
        }
        self.remote.stop(id).await
    }

    async fn respawn(&self, id: &str, command: &str) -> Result<(), SessionError> {
        self.remote.respawn(id, command).await
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        self.remote.exists(id).await
    }

    async fn send(&self, id: &str, text: &str) -> Result<(), SessionError> {
        self.remote.send(id, text).await
    }

    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError> {
        self.remote.send_literal(id, text).await
    }

    async fn send_control(&self, id: &str, key: &str) -> Result<(), SessionError> {
        self.remote.send_control(id, key).await
    }

    async fn nudge(&self, id: &str, message: &str) -> Result<(), SessionError> {
        self.remote.nudge(id, message).await
    }

    async fn capture(&self, id: &str, lines: u32) -> Result<String, SessionError> {
        self.remote.capture(id, lines).await
    }

    async fn capture_all(&self, id: &str) -> Result<String, SessionError> {
        self.remote.capture_all(id).await
    }

    async fn is_running(&self, id: &str, process_names: &[String]) -> bool {
        self.remote.is_running(id, process_names).await
    }

    async fn list(&self) -> Result<Vec<SessionId>, SessionError> {
        self.remote.list().await
    }

    async fn get_info(&self, id: &str) -> Result<SessionInfo, SessionError> {
        self.remote.get_info(id).await
    }

    async fn get_start_command(&self, id: &str) -> Result<String, SessionError> {
        self.remote.get_start_command(id).await
    }

    async fn attach(&self, id: &str) -> Result<(), SessionError> {
        if self.has_mirror(id).await {
            return self.local.attach(id).await;
        }
        self.remote.attach(id).await
    }

    async fn switch_to(&self, id: &str) -> Result<(), SessionError> {
        if self.has_mirror(id).await {
            return self.local.switch_to(id).await;
        }
        Err(SessionError::Unsupported(format!(
            "switch_to {id}: no local mirror"
        )))
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
